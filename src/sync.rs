//! Sync engine
//!
//! Walks the repository listing and brings each local clone in line with its
//! remote: missing repositories are cloned, dirty ones are optionally
//! committed and pushed after operator confirmation, and the current branch
//! is fast-forward-pulled. Repositories run through a fixed-size worker pool
//! with per-repository isolation; one failing repository never aborts the
//! rest, and a hard failure is reported through the run's exit code instead.

use anyhow::{anyhow, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{CloneFailurePolicy, Config};
use crate::git::GitClient;
use crate::github::RepoRecord;
use crate::prompt::Prompter;

/// Result of syncing one repository
#[derive(Debug, Clone)]
pub enum SyncResult {
    /// Repository was cloned fresh
    Cloned { path: PathBuf },
    /// Repository was fast-forwarded to the remote
    Pulled { path: PathBuf, branch: String },
    /// Repository was already in sync with the remote
    UpToDate { path: PathBuf },
    /// Repository was left alone (e.g. detached HEAD)
    Skipped { path: PathBuf, reason: String },
    /// Operation failed; `hard` failures make the whole run exit non-zero
    Failed {
        path: PathBuf,
        error: String,
        hard: bool,
    },
}

/// Aggregate results of a sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub total_repositories: usize,
    pub cloned: usize,
    pub pulled: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration: Duration,
    pub results: Vec<SyncResult>,
}

impl SyncSummary {
    /// Whether any repository hit a failure that must fail the run
    pub fn has_hard_failures(&self) -> bool {
        self.results
            .iter()
            .any(|r| matches!(r, SyncResult::Failed { hard: true, .. }))
    }
}

/// Planned action for a repository, used by dry-run reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Not present locally; would be cloned
    Clone,
    /// Present and clean; would be pulled
    Pull,
    /// Present with uncommitted changes; would prompt before pulling
    PromptThenPull,
}

/// Dry-run analysis for one repository
#[derive(Debug, Clone)]
pub struct RepoPlan {
    pub name: String,
    pub path: PathBuf,
    pub action: PlannedAction,
}

/// The sync engine
#[derive(Clone)]
pub struct SyncEngine {
    config: Arc<Config>,
    git: GitClient,
    prompter: Arc<dyn Prompter>,
}

impl SyncEngine {
    pub fn new(config: Config, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            config: Arc::new(config),
            git: GitClient::new(),
            prompter,
        }
    }

    /// Local path a repository record maps to
    pub fn repo_path(&self, record: &RepoRecord) -> Result<PathBuf> {
        Ok(self.config.clone_dir_path()?.join(&record.name))
    }

    /// Synchronize all repositories and compile a summary
    pub async fn sync(&self, repos: Vec<RepoRecord>) -> Result<SyncSummary> {
        let start = Instant::now();
        let clone_dir = self.config.clone_dir_path()?;

        tokio::fs::create_dir_all(&clone_dir).await?;
        println!("📁 Using clone directory: {}", clone_dir.display());

        let max_parallel = self.config.sync.max_parallel.max(1);

        info!(
            "Syncing {} repositories with up to {} in parallel",
            repos.len(),
            max_parallel
        );

        let semaphore = Arc::new(Semaphore::new(max_parallel));
        // At most one interactive prompt pending at a time
        let prompt_gate = Arc::new(Mutex::new(()));

        let mut futures = FuturesUnordered::new();

        for repo in repos {
            let engine = self.clone();
            let semaphore = semaphore.clone();
            let prompt_gate = prompt_gate.clone();
            let path = clone_dir.join(&repo.name);

            futures.push(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("semaphore closed unexpectedly");

                engine.sync_one(&repo, path, &prompt_gate).await
            });
        }

        let mut results = Vec::new();
        while let Some(result) = futures.next().await {
            debug!("Sync completed: {:?}", result);
            results.push(result);
        }

        Ok(compile_summary(results, start.elapsed()))
    }

    /// Run one git operation under the configured timeout
    ///
    /// The timeout applies to a single git invocation; time spent waiting
    /// for an operator to answer a prompt never counts against it.
    async fn timed<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = Duration::from_secs(self.config.sync.timeout);
        match timeout(limit, operation).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("git operation timed out after {}s", limit.as_secs())),
        }
    }

    /// Sync a single repository; all failures are folded into the result
    async fn sync_one(
        &self,
        repo: &RepoRecord,
        path: PathBuf,
        prompt_gate: &Mutex<()>,
    ) -> SyncResult {
        if self.git.is_repository(&path) {
            self.update_existing(repo, path, prompt_gate).await
        } else {
            self.clone_missing(repo, path).await
        }
    }

    /// Existing clone: optional commit+push of local changes, then pull
    async fn update_existing(
        &self,
        repo: &RepoRecord,
        path: PathBuf,
        prompt_gate: &Mutex<()>,
    ) -> SyncResult {
        println!("🔄 Updating existing repo: {}", repo.name);

        let status = match self.timed(self.git.status_porcelain(&path)).await {
            Ok(status) => status,
            Err(e) => {
                return SyncResult::Failed {
                    path,
                    error: e.to_string(),
                    hard: true,
                }
            }
        };

        if !status.trim().is_empty() {
            let guard = prompt_gate.lock().await;

            println!("\n📝 Uncommitted changes detected in {}:", repo.name);
            println!("{}", status.trim_end());

            let confirmed = match self
                .prompter
                .confirm(&format!("Commit all changes in {}?", repo.name))
            {
                Ok(answer) => answer,
                Err(e) => {
                    return SyncResult::Failed {
                        path,
                        error: format!("Prompt failed: {}", e),
                        hard: true,
                    }
                }
            };
            drop(guard);

            if confirmed {
                if let Err(e) = self.commit_and_push(repo, &path).await {
                    return SyncResult::Failed {
                        path,
                        error: e.to_string(),
                        hard: true,
                    };
                }
            }
            // Declined: the pull below may still fail on divergence, which
            // is reported as a hard failure for this repository only.
        }

        let branch = match self.timed(self.git.current_branch(&path)).await {
            Ok(Some(branch)) => branch,
            Ok(None) => {
                return SyncResult::Skipped {
                    path,
                    reason: "detached HEAD, pull skipped".to_string(),
                }
            }
            Err(e) => {
                return SyncResult::Failed {
                    path,
                    error: e.to_string(),
                    hard: true,
                }
            }
        };

        let pulled = self
            .timed(
                self.git
                    .pull(&path, &branch, self.config.sync.fast_forward_only),
            )
            .await;

        match pulled {
            Ok(true) => SyncResult::Pulled { path, branch },
            Ok(false) => SyncResult::UpToDate { path },
            Err(e) => SyncResult::Failed {
                path,
                error: e.to_string(),
                hard: true,
            },
        }
    }

    async fn commit_and_push(&self, repo: &RepoRecord, path: &std::path::Path) -> Result<()> {
        self.timed(self.git.add_all(path)).await?;
        self.timed(self.git.commit(path, &self.config.commit_message(&repo.name)))
            .await?;

        let branch = self
            .timed(self.git.current_branch(path))
            .await?
            .ok_or_else(|| anyhow!("cannot push from detached HEAD"))?;

        self.timed(self.git.push(path, &branch)).await
    }

    /// Missing clone: clone it, honoring the configured failure policy
    async fn clone_missing(&self, repo: &RepoRecord, path: PathBuf) -> SyncResult {
        println!("🚀 Cloning new repository: {}", repo.name);

        match self.timed(self.git.clone(&repo.url, &path)).await {
            Ok(()) => SyncResult::Cloned { path },
            Err(e) => {
                let hard = self.config.sync.clone_failure == CloneFailurePolicy::Fatal;
                if !hard {
                    warn!("Clone failed for {} (continuing): {}", repo.name, e);
                }
                SyncResult::Failed {
                    path,
                    error: e.to_string(),
                    hard,
                }
            }
        }
    }

    /// Analyze repositories without touching them (dry run)
    pub async fn analyze(&self, repos: &[RepoRecord]) -> Result<Vec<RepoPlan>> {
        let clone_dir = self.config.clone_dir_path()?;
        let mut plans = Vec::with_capacity(repos.len());

        for repo in repos {
            let path = clone_dir.join(&repo.name);

            let action = if !self.git.is_repository(&path) {
                PlannedAction::Clone
            } else {
                let status = self.git.status_porcelain(&path).await?;
                if status.trim().is_empty() {
                    PlannedAction::Pull
                } else {
                    PlannedAction::PromptThenPull
                }
            };

            plans.push(RepoPlan {
                name: repo.name.clone(),
                path,
                action,
            });
        }

        Ok(plans)
    }
}

/// Fold per-repository results into a summary
fn compile_summary(results: Vec<SyncResult>, duration: Duration) -> SyncSummary {
    let mut summary = SyncSummary {
        total_repositories: results.len(),
        cloned: 0,
        pulled: 0,
        up_to_date: 0,
        skipped: 0,
        failed: 0,
        duration,
        results: Vec::new(),
    };

    for result in &results {
        match result {
            SyncResult::Cloned { .. } => summary.cloned += 1,
            SyncResult::Pulled { .. } => summary.pulled += 1,
            SyncResult::UpToDate { .. } => summary.up_to_date += 1,
            SyncResult::Skipped { .. } => summary.skipped += 1,
            SyncResult::Failed { .. } => summary.failed += 1,
        }
    }

    summary.results = results;
    summary
}
