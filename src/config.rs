use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for repoherd
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory where repositories are cloned
    #[serde(default = "default_clone_dir")]
    pub clone_dir: String,

    /// GitHub settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Dependency installation settings
    #[serde(default)]
    pub install: InstallConfig,

    /// Synchronization behavior settings
    #[serde(default)]
    pub sync: SyncConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GitHubConfig {
    /// GitHub username (auto-detected via `gh api user` if null)
    pub username: Option<String>,
}

/// Dependency installation configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InstallConfig {
    /// Install missing tools (git, gh) via the platform package manager
    #[serde(default = "default_true")]
    pub auto_install: bool,
}

/// What to do when a clone fails
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CloneFailurePolicy {
    /// Log the failure, record it in the summary, keep going
    Warn,
    /// Treat the failure as hard: the run exits non-zero
    Fatal,
}

/// Synchronization configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Maximum parallel repository operations
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Fast-forward only pulls
    #[serde(default = "default_true")]
    pub fast_forward_only: bool,

    /// Clone failure policy
    #[serde(default = "default_clone_failure")]
    pub clone_failure: CloneFailurePolicy,

    /// Commit message for auto-commits; `{repo}` expands to the repo name
    #[serde(default = "default_commit_message_template")]
    pub commit_message_template: String,

    /// Timeout for a single git operation in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

// Default value functions
fn default_clone_dir() -> String {
    "~/git".to_string()
}
fn default_true() -> bool {
    true
}
fn default_max_parallel() -> usize {
    4
}
fn default_clone_failure() -> CloneFailurePolicy {
    CloneFailurePolicy::Warn
}
fn default_commit_message_template() -> String {
    "Auto-commit before pull: {repo}".to_string()
}
fn default_timeout() -> u64 {
    300
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            auto_install: default_true(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            fast_forward_only: default_true(),
            clone_failure: default_clone_failure(),
            commit_message_template: default_commit_message_template(),
            timeout: default_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clone_dir: default_clone_dir(),
            github: GitHubConfig::default(),
            install: InstallConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("repoherd").join("config.yml"))
    }

    /// Expanded clone directory (resolves `~` and environment variables)
    pub fn clone_dir_path(&self) -> Result<PathBuf> {
        let expanded =
            shellexpand::full(&self.clone_dir).context("Failed to expand clone_dir path")?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Commit message for a repository, from the configured template
    pub fn commit_message(&self, repo_name: &str) -> String {
        self.sync
            .commit_message_template
            .replace("{repo}", repo_name)
    }
}
