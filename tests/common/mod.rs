//! Shared helpers for repoherd integration tests
//!
//! All git fixtures are local: a bare repository stands in for the GitHub
//! remote, so clone/push/pull run for real without touching the network.

use anyhow::Result;
use repoherd::prompt::Prompter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run a git command in `dir`, panicking on failure
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Capture a git command's stdout in `dir`
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to spawn git");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a bare "remote" repository seeded with one commit on main
pub fn create_remote(root: &Path, name: &str) -> PathBuf {
    let seed = root.join(format!("{}-seed", name));
    std::fs::create_dir_all(&seed).unwrap();

    run_git(&seed, &["init", "-b", "main"]);
    run_git(&seed, &["config", "user.email", "test@example.com"]);
    run_git(&seed, &["config", "user.name", "Test User"]);
    std::fs::write(seed.join("README.md"), format!("# {}\n", name)).unwrap();
    run_git(&seed, &["add", "-A"]);
    run_git(&seed, &["commit", "-m", "initial"]);

    let bare = root.join(format!("{}.git", name));
    run_git(
        root,
        &[
            "clone",
            "--bare",
            seed.to_str().unwrap(),
            bare.to_str().unwrap(),
        ],
    );
    bare
}

/// Clone a remote into `<clone_dir>/<name>` and set commit identity
pub fn clone_into(clone_dir: &Path, remote: &Path, name: &str) -> PathBuf {
    std::fs::create_dir_all(clone_dir).unwrap();
    let target = clone_dir.join(name);
    run_git(
        clone_dir,
        &["clone", remote.to_str().unwrap(), target.to_str().unwrap()],
    );
    run_git(&target, &["config", "user.email", "test@example.com"]);
    run_git(&target, &["config", "user.name", "Test User"]);
    target
}

/// Number of commits reachable from HEAD
pub fn commit_count(repo: &Path) -> usize {
    git_stdout(repo, &["rev-list", "--count", "HEAD"])
        .parse()
        .expect("rev-list output")
}

/// Prompter answering every confirmation the same way, counting calls
pub struct FixedPrompter {
    answer: bool,
    calls: AtomicUsize,
}

impl FixedPrompter {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Prompter for FixedPrompter {
    fn confirm(&self, _question: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }

    fn input(&self, _question: &str) -> Result<String> {
        Ok("testuser".to_string())
    }
}

/// Prompter that takes its time before answering, like a person would
pub struct SlowPrompter {
    answer: bool,
    delay: std::time::Duration,
}

impl SlowPrompter {
    pub fn new(answer: bool, delay: std::time::Duration) -> Self {
        Self { answer, delay }
    }
}

impl Prompter for SlowPrompter {
    fn confirm(&self, _question: &str) -> Result<bool> {
        std::thread::sleep(self.delay);
        Ok(self.answer)
    }

    fn input(&self, _question: &str) -> Result<String> {
        std::thread::sleep(self.delay);
        Ok("testuser".to_string())
    }
}

/// Prompter that fails the test if it is ever consulted
pub struct PanicPrompter;

impl Prompter for PanicPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        panic!("unexpected confirmation prompt: {}", question);
    }

    fn input(&self, question: &str) -> Result<String> {
        panic!("unexpected input prompt: {}", question);
    }
}
