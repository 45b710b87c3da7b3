//! Platform detection and dependency installation
//!
//! Classifies the host into an OS/package-manager category and installs the
//! external tools (`git`, `gh`) through the matching package manager when
//! they are missing from PATH.

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

/// Host platform category, keyed by OS and available package manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    LinuxApt,
    LinuxDnf,
    LinuxYum,
    LinuxUnknown,
    Macos,
    Windows,
    Unknown,
}

/// How to install one package: preparation commands that must all succeed,
/// then candidate install commands tried in order until one succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub pre: Vec<Vec<String>>,
    pub candidates: Vec<Vec<String>>,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl Platform {
    /// Detect the platform of the running host
    pub fn detect() -> Self {
        Self::classify(
            std::env::consts::OS,
            Path::new("/usr/bin/apt").exists(),
            Path::new("/usr/bin/dnf").exists(),
            Path::new("/usr/bin/yum").exists(),
        )
    }

    /// Classify an (os, package-manager presence) combination
    ///
    /// Package managers are checked in apt, dnf, yum order so a host with
    /// several installed gets a deterministic answer.
    pub fn classify(os: &str, has_apt: bool, has_dnf: bool, has_yum: bool) -> Self {
        match os {
            "linux" => {
                if has_apt {
                    Platform::LinuxApt
                } else if has_dnf {
                    Platform::LinuxDnf
                } else if has_yum {
                    Platform::LinuxYum
                } else {
                    Platform::LinuxUnknown
                }
            }
            "macos" => Platform::Macos,
            "windows" => Platform::Windows,
            _ => Platform::Unknown,
        }
    }

    /// Human-readable platform name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::LinuxApt => "linux-apt",
            Platform::LinuxDnf => "linux-dnf",
            Platform::LinuxYum => "linux-yum",
            Platform::LinuxUnknown => "linux-unknown",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
            Platform::Unknown => "unknown",
        }
    }

    /// Install plan for a package on this platform, or `None` when the
    /// platform has no known installer
    pub fn install_plan(&self, package: &str) -> Option<InstallPlan> {
        match self {
            Platform::LinuxApt => Some(InstallPlan {
                pre: vec![argv(&["sudo", "apt", "update", "-y"])],
                candidates: vec![argv(&["sudo", "apt", "install", "-y", package])],
            }),
            Platform::LinuxDnf => Some(InstallPlan {
                pre: vec![],
                candidates: vec![argv(&["sudo", "dnf", "install", "-y", package])],
            }),
            Platform::LinuxYum => Some(InstallPlan {
                pre: vec![],
                candidates: vec![argv(&["sudo", "yum", "install", "-y", package])],
            }),
            Platform::Macos => Some(InstallPlan {
                pre: vec![],
                candidates: vec![argv(&["brew", "install", package])],
            }),
            // winget first, chocolatey as fallback
            Platform::Windows => Some(InstallPlan {
                pre: vec![],
                candidates: vec![
                    argv(&["winget", "install", "--id", winget_id(package), "--silent"]),
                    argv(&["choco", "install", package, "-y"]),
                ],
            }),
            Platform::LinuxUnknown | Platform::Unknown => None,
        }
    }
}

/// Map a tool name to its winget package identifier
fn winget_id(package: &str) -> &str {
    match package {
        "git" => "Git.Git",
        "gh" => "GitHub.cli",
        other => other,
    }
}

/// Check if a command is available in PATH
pub fn is_command_available(command: &str) -> bool {
    std::process::Command::new("which")
        .arg(command)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Ensures required external tools are present, installing them if allowed
pub struct DependencyInstaller {
    platform: Platform,
    auto_install: bool,
}

impl DependencyInstaller {
    pub fn new(platform: Platform, auto_install: bool) -> Self {
        Self {
            platform,
            auto_install,
        }
    }

    /// Ensure every tool is on PATH, installing missing ones
    ///
    /// Installing an already-installed package is assumed idempotent, so a
    /// tool that passes the presence check is skipped without invoking the
    /// package manager at all.
    pub async fn ensure_installed(&self, tools: &[&str]) -> Result<()> {
        for tool in tools {
            if is_command_available(tool) {
                debug!("{} is already installed", tool);
                println!("✅ {} is already installed", tool);
                continue;
            }

            if !self.auto_install {
                bail!(
                    "{} is not installed and auto_install is disabled. \
                     Install it manually and re-run.",
                    tool
                );
            }

            self.install(tool).await?;
        }

        Ok(())
    }

    /// Install one package through the platform package manager
    async fn install(&self, package: &str) -> Result<()> {
        let plan = self.platform.install_plan(package).ok_or_else(|| {
            anyhow!(
                "Unsupported platform: {}. Install {} manually.",
                self.platform.name(),
                package
            )
        })?;

        info!(
            "Installing {} via {} package manager",
            package,
            self.platform.name()
        );
        println!("🔧 Installing {}...", package);

        for pre in &plan.pre {
            if !run_command(pre).await? {
                bail!("Preparation command failed: {}", pre.join(" "));
            }
        }

        for candidate in &plan.candidates {
            if run_command(candidate).await? {
                info!("Installed {}", package);
                return Ok(());
            }
            debug!("Installer candidate failed: {}", candidate.join(" "));
        }

        bail!("All installers failed for {}", package)
    }
}

/// Run an argument-vector command with inherited stdio, returning whether
/// it exited successfully
async fn run_command(cmd: &[String]) -> Result<bool> {
    let (program, args) = cmd
        .split_first()
        .ok_or_else(|| anyhow!("Empty command"))?;

    let status = AsyncCommand::new(program)
        .args(args)
        .status()
        .await
        .with_context(|| format!("Failed to execute: {}", cmd.join(" ")))?;

    Ok(status.success())
}
