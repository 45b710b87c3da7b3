//! System health checks
//!
//! Preflight diagnostics behind `repoherd doctor`: external tools, GitHub
//! CLI authentication, SSH identity, and the clone directory.

use std::path::Path;

use crate::auth::is_identity_probe_success;
use crate::config::Config;
use crate::platform::{is_command_available, Platform};

/// Result of system health checks
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Git installation status
    pub git: CheckResult,
    /// GitHub CLI installation status
    pub gh: CheckResult,
    /// GitHub CLI authentication status
    pub gh_auth: CheckResult,
    /// SSH identity probe status (warning only, not required)
    pub ssh: CheckResult,
    /// Clone directory status
    pub clone_dir: CheckResult,
    /// Platform/package-manager detection
    pub platform: CheckResult,
}

/// Result of an individual health check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
    pub is_warning: bool,
}

#[allow(dead_code)]
impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: None,
            is_warning: false,
        }
    }

    fn ok_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: None,
            is_warning: false,
        }
    }

    fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn warning_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: true,
        }
    }
}

impl HealthCheck {
    /// Run all health checks
    pub async fn run(config: &Config) -> Self {
        Self {
            git: Self::check_tool("git"),
            gh: Self::check_tool("gh"),
            gh_auth: Self::check_gh_auth().await,
            ssh: Self::check_ssh_probe().await,
            clone_dir: Self::check_clone_dir(config),
            platform: Self::check_platform(),
        }
    }

    /// Check if all required checks passed (excludes warnings)
    pub fn all_passed(&self) -> bool {
        self.git.passed && self.gh.passed && self.gh_auth.passed && self.clone_dir.passed
        // SSH probe and platform detection are informational
    }

    /// Get list of warnings
    pub fn warnings(&self) -> Vec<&CheckResult> {
        self.all_checks()
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| r.is_warning)
            .collect()
    }

    fn check_tool(tool: &str) -> CheckResult {
        match std::process::Command::new(tool).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                let first_line = version.lines().next().unwrap_or("").trim().to_string();
                CheckResult::ok_with_details(format!("{} installed", tool), first_line)
            }
            Ok(_) => CheckResult::error(format!("{} command failed", tool)),
            Err(_) => CheckResult::error_with_details(
                format!("{} not found in PATH", tool),
                "Run: repoherd setup",
            ),
        }
    }

    async fn check_gh_auth() -> CheckResult {
        if !is_command_available("gh") {
            return CheckResult::error_with_details(
                "GitHub CLI not available",
                "Install gh, then run: gh auth login",
            );
        }

        match tokio::process::Command::new("gh")
            .args(["auth", "status"])
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                CheckResult::ok("GitHub CLI is authenticated")
            }
            Ok(output) => CheckResult::error_with_details(
                "GitHub CLI is not authenticated",
                format!(
                    "{}\nRun: gh auth login",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ),
            Err(e) => CheckResult::error_with_details("Failed to run gh auth status", e.to_string()),
        }
    }

    async fn check_ssh_probe() -> CheckResult {
        match tokio::process::Command::new("ssh")
            .args(["-T", "git@github.com"])
            .output()
            .await
        {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));

                if is_identity_probe_success(&combined) {
                    CheckResult::ok("SSH identity accepted by github.com")
                } else {
                    CheckResult::warning_with_details(
                        "SSH identity probe did not succeed",
                        combined.trim().to_string(),
                    )
                }
            }
            Err(e) => CheckResult::warning_with_details("Failed to run ssh probe", e.to_string()),
        }
    }

    fn check_clone_dir(config: &Config) -> CheckResult {
        match config.clone_dir_path() {
            Ok(path) => {
                if path.exists() {
                    CheckResult::ok_with_details("Clone directory exists", path.display().to_string())
                } else {
                    // The sync run creates it, so absence is only informational
                    CheckResult::warning_with_details(
                        "Clone directory does not exist yet",
                        format!("Will be created at: {}", path.display()),
                    )
                }
            }
            Err(e) => CheckResult::error_with_details("Invalid clone directory path", e.to_string()),
        }
    }

    fn check_platform() -> CheckResult {
        let platform = Platform::detect();
        match platform.install_plan("git") {
            Some(_) => CheckResult::ok_with_details("Platform supported", platform.name()),
            None => CheckResult::warning_with_details(
                "No known package manager for this platform",
                format!(
                    "Detected: {}. Missing tools must be installed manually.",
                    platform.name()
                ),
            ),
        }
    }

    /// Get all checks as a slice for iteration
    pub fn all_checks(&self) -> [(&'static str, &CheckResult); 6] {
        [
            ("Git Installation", &self.git),
            ("GitHub CLI Installation", &self.gh),
            ("GitHub Authentication", &self.gh_auth),
            ("SSH Identity", &self.ssh),
            ("Clone Directory", &self.clone_dir),
            ("Platform Detection", &self.platform),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok() -> CheckResult {
        CheckResult::ok("ok")
    }

    fn err() -> CheckResult {
        CheckResult::error("failed")
    }

    fn warn() -> CheckResult {
        CheckResult::warning_with_details("warn", "details")
    }

    fn health(git: CheckResult, gh: CheckResult, gh_auth: CheckResult) -> HealthCheck {
        HealthCheck {
            git,
            gh,
            gh_auth,
            ssh: warn(),
            clone_dir: ok(),
            platform: ok(),
        }
    }

    #[test]
    fn test_check_result_constructors() {
        let result = CheckResult::ok_with_details("passed", "extra");
        assert!(result.passed);
        assert!(!result.is_warning);
        assert_eq!(result.details, Some("extra".to_string()));

        let result = CheckResult::error("broken");
        assert!(!result.passed);

        let result = CheckResult::warning_with_details("careful", "why");
        assert!(result.passed); // Warnings still "pass"
        assert!(result.is_warning);
    }

    #[test]
    fn test_all_passed_ignores_ssh_warning() {
        let health = health(ok(), ok(), ok());
        assert!(health.all_passed());
    }

    #[test]
    fn test_all_passed_with_failing_tool() {
        assert!(!health(err(), ok(), ok()).all_passed());
        assert!(!health(ok(), err(), ok()).all_passed());
        assert!(!health(ok(), ok(), err()).all_passed());
    }

    #[test]
    fn test_warnings_listed() {
        let health = health(ok(), ok(), ok());
        let warnings = health.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_warning);
    }

    #[test]
    fn test_all_checks_returns_all_six() {
        let health = health(ok(), ok(), ok());
        let checks = health.all_checks();
        assert_eq!(checks.len(), 6);
        assert_eq!(checks[0].0, "Git Installation");
        assert_eq!(checks[2].0, "GitHub Authentication");
        assert_eq!(checks[4].0, "Clone Directory");
    }

    #[test]
    fn test_check_git_tool() {
        let result = HealthCheck::check_tool("git");
        // Git is present in the dev environment
        assert!(result.passed);
        assert!(result.details.is_some());
    }

    #[test]
    fn test_check_missing_tool() {
        let result = HealthCheck::check_tool("definitely-not-a-real-tool-xyz");
        assert!(!result.passed);
    }

    #[test]
    fn test_check_clone_dir_existing() {
        let mut config = Config::default();
        config.clone_dir = "/tmp".to_string();
        let result = HealthCheck::check_clone_dir(&config);
        assert!(result.passed);
        assert!(!result.is_warning);
    }

    #[test]
    fn test_check_clone_dir_missing_is_warning() {
        let mut config = Config::default();
        config.clone_dir = "/nonexistent/path/that/does/not/exist".to_string();
        let result = HealthCheck::check_clone_dir(&config);
        assert!(result.passed);
        assert!(result.is_warning);
    }
}
