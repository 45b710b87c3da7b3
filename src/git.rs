//! Git operations
//!
//! Thin wrapper over the `git` binary. Every operation takes the repository
//! path explicitly and runs with `current_dir`; the process working
//! directory is never changed. Commands are built as argument vectors, so
//! repository names and URLs never pass through a shell.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

/// Git command wrapper
#[derive(Debug, Clone, Default)]
pub struct GitClient;

impl GitClient {
    pub fn new() -> Self {
        Self
    }

    /// Whether the path holds a git working copy
    pub fn is_repository(&self, path: &Path) -> bool {
        path.is_dir() && path.join(".git").exists()
    }

    /// Working tree status in porcelain format; empty string means clean
    pub async fn status_porcelain(&self, path: &Path) -> Result<String> {
        let output = AsyncCommand::new("git")
            .args(["status", "--porcelain"])
            .current_dir(path)
            .output()
            .await
            .context("Failed to check git status")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git status failed in {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Stage every change in the working tree
    pub async fn add_all(&self, path: &Path) -> Result<()> {
        let output = AsyncCommand::new("git")
            .args(["add", "-A"])
            .current_dir(path)
            .output()
            .await
            .context("Failed to stage changes")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git add failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(())
    }

    /// Create a commit with the given message
    pub async fn commit(&self, path: &Path, message: &str) -> Result<()> {
        let output = AsyncCommand::new("git")
            .args(["commit", "-m", message])
            .current_dir(path)
            .output()
            .await
            .context("Failed to create commit")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git commit failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        info!("Committed changes in {}", path.display());
        Ok(())
    }

    /// Name of the currently checked-out branch; `None` on detached HEAD
    pub async fn current_branch(&self, path: &Path) -> Result<Option<String>> {
        let output = AsyncCommand::new("git")
            .args(["branch", "--show-current"])
            .current_dir(path)
            .output()
            .await
            .context("Failed to get current branch")?;

        if output.status.success() && !output.stdout.is_empty() {
            let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if branch.is_empty() {
                Ok(None)
            } else {
                Ok(Some(branch))
            }
        } else {
            Ok(None)
        }
    }

    /// Push the given branch to origin
    pub async fn push(&self, path: &Path, branch: &str) -> Result<()> {
        debug!("Pushing {} in {}", branch, path.display());

        let output = AsyncCommand::new("git")
            .args(["push", "origin", branch])
            .current_dir(path)
            .output()
            .await
            .context("Failed to push to remote")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git push failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        info!("Pushed {} in {}", branch, path.display());
        Ok(())
    }

    /// Pull the given branch from origin; returns `true` when commits came in
    ///
    /// `--ff-only` is passed per invocation rather than configured
    /// process-wide, so the user's git configuration is left untouched.
    pub async fn pull(&self, path: &Path, branch: &str, fast_forward_only: bool) -> Result<bool> {
        let mut args = vec!["pull"];
        if fast_forward_only {
            args.push("--ff-only");
        }
        args.push("origin");
        args.push(branch);

        let output = AsyncCommand::new("git")
            .args(&args)
            .current_dir(path)
            .output()
            .await
            .context("Failed to pull from remote")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git pull failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let updated = !stdout.contains("Already up to date");

        info!("Pulled {} in {}", branch, path.display());
        Ok(updated)
    }

    /// Clone a repository URL into the target path
    pub async fn clone(&self, url: &str, target: &Path) -> Result<()> {
        debug!("Cloning {} -> {}", url, target.display());

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create parent directory")?;
        }

        let output = AsyncCommand::new("git")
            .arg("clone")
            .arg(url)
            .arg(target)
            .output()
            .await
            .context("Failed to execute git clone")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git clone failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        info!("Cloned {} -> {}", url, target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Create a git repository with one commit and return its path
    fn init_test_repo(dir: &Path) -> PathBuf {
        let repo = dir.join("repo");
        std::fs::create_dir_all(&repo).unwrap();

        let run = |args: &[&str]| {
            let output = std::process::Command::new("git")
                .args(args)
                .current_dir(&repo)
                .output()
                .expect("git invocation failed");
            assert!(
                output.status.success(),
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        };

        run(&["init", "-b", "main"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "Test User"]);
        std::fs::write(repo.join("README.md"), "# test\n").unwrap();
        run(&["add", "-A"]);
        run(&["commit", "-m", "initial"]);

        repo
    }

    #[test]
    fn test_is_repository() {
        let temp = TempDir::new().unwrap();
        let git = GitClient::new();

        assert!(!git.is_repository(temp.path()));
        assert!(!git.is_repository(&temp.path().join("missing")));

        std::fs::create_dir_all(temp.path().join("fake/.git")).unwrap();
        assert!(git.is_repository(&temp.path().join("fake")));
    }

    #[tokio::test]
    async fn test_status_clean_and_dirty() {
        let temp = TempDir::new().unwrap();
        let repo = init_test_repo(temp.path());
        let git = GitClient::new();

        let status = git.status_porcelain(&repo).await.unwrap();
        assert!(status.is_empty(), "fresh commit should be clean");

        std::fs::write(repo.join("new-file.txt"), "dirty\n").unwrap();
        let status = git.status_porcelain(&repo).await.unwrap();
        assert!(status.contains("new-file.txt"));
    }

    #[tokio::test]
    async fn test_current_branch() {
        let temp = TempDir::new().unwrap();
        let repo = init_test_repo(temp.path());
        let git = GitClient::new();

        let branch = git.current_branch(&repo).await.unwrap();
        assert_eq!(branch.as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn test_add_and_commit() {
        let temp = TempDir::new().unwrap();
        let repo = init_test_repo(temp.path());
        let git = GitClient::new();

        std::fs::write(repo.join("change.txt"), "content\n").unwrap();
        git.add_all(&repo).await.unwrap();
        git.commit(&repo, "Auto-commit before pull: repo")
            .await
            .unwrap();

        let status = git.status_porcelain(&repo).await.unwrap();
        assert!(status.is_empty(), "everything should be committed");
    }

    #[tokio::test]
    async fn test_clone_from_local_path() {
        let temp = TempDir::new().unwrap();
        let source = init_test_repo(temp.path());
        let git = GitClient::new();

        let target = temp.path().join("clones/copy");
        git.clone(source.to_str().unwrap(), &target).await.unwrap();

        assert!(git.is_repository(&target));
        assert!(target.join("README.md").exists());
    }

    #[tokio::test]
    async fn test_clone_invalid_url_fails() {
        let temp = TempDir::new().unwrap();
        let git = GitClient::new();

        let target = temp.path().join("never-created");
        let result = git
            .clone(temp.path().join("no-such-repo").to_str().unwrap(), &target)
            .await;
        assert!(result.is_err());
    }
}
