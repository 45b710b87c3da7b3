//! repoherd - GitHub repository synchronization
//!
//! repoherd keeps a local directory of clones in line with the authenticated
//! user's GitHub repositories: it installs the external tools it depends on
//! (`git`, `gh`), verifies GitHub CLI and SSH authentication, lists the
//! user's repositories through the GitHub CLI, clones the ones that are
//! missing, and fast-forward-pulls the ones that exist (offering to commit
//! and push local changes first).
//!
//! ## Modules
//!
//! - [`platform`]: OS/package-manager detection and dependency installation
//! - [`auth`]: GitHub CLI login state and SSH identity probe
//! - [`github`]: repository listing via the `gh` CLI
//! - [`git`]: git operations with explicit paths and argv invocation
//! - [`sync`]: the per-repository sync state machine and worker pool
//! - [`health`]: preflight diagnostics for `repoherd doctor`

pub mod auth;
pub mod config;
pub mod git;
pub mod github;
pub mod health;
pub mod platform;
pub mod prompt;
pub mod sync;

pub use config::Config;
pub use git::GitClient;
pub use github::{GhRepoLister, RepoRecord, RepoSource};
pub use health::HealthCheck;
pub use platform::{DependencyInstaller, Platform};
pub use prompt::{AssumeYes, Prompter, TerminalPrompter};
pub use sync::{SyncEngine, SyncResult, SyncSummary};
