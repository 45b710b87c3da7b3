//! Repository listing via the GitHub CLI
//!
//! The listing is delegated entirely to `gh repo list` with a jq projection
//! producing one `name url` pair per line. Listing sits behind the
//! [`RepoSource`] trait so the sync engine can be driven from a fixed set of
//! records in tests.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, warn};

/// One remote repository: its name and clone URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    pub name: String,
    pub url: String,
}

/// Source of repository records
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// List repositories, in the order the source returns them
    async fn list_repositories(&self) -> Result<Vec<RepoRecord>>;

    /// Source name for display/logging
    fn source_name(&self) -> &'static str;
}

/// Parse `gh repo list` output: one whitespace-separated `name url` pair
/// per line
///
/// Empty input is a valid empty listing. Lines with fewer than two fields
/// are skipped with a warning instead of aborting the run.
pub fn parse_repo_list(output: &str) -> Vec<RepoRecord> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }

            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(name), Some(url)) => Some(RepoRecord {
                    name: name.to_string(),
                    url: url.to_string(),
                }),
                _ => {
                    warn!("Skipping malformed repository listing line: {:?}", line);
                    None
                }
            }
        })
        .collect()
}

/// Repository source backed by the `gh` CLI
pub struct GhRepoLister {
    username: String,
}

impl GhRepoLister {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[async_trait]
impl RepoSource for GhRepoLister {
    async fn list_repositories(&self) -> Result<Vec<RepoRecord>> {
        println!("📡 Fetching repository list for {}...", self.username);
        debug!("Listing repositories via gh for {}", self.username);

        let output = AsyncCommand::new("gh")
            .args([
                "repo",
                "list",
                &self.username,
                "--json",
                "name,url",
                "--jq",
                r#".[] | "\(.name) \(.url)""#,
            ])
            .output()
            .await
            .context("Failed to run gh repo list")?;

        if !output.status.success() {
            bail!(
                "gh repo list failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let records = parse_repo_list(&stdout);

        info!(
            "Found {} repositories for {}",
            records.len(),
            self.username
        );
        Ok(records)
    }

    fn source_name(&self) -> &'static str {
        "GitHub CLI"
    }
}
