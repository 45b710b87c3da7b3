use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repoherd::sync::PlannedAction;
use repoherd::{
    auth, AssumeYes, Config, DependencyInstaller, GhRepoLister, HealthCheck, Platform, Prompter,
    RepoSource, SyncEngine, SyncResult, SyncSummary, TerminalPrompter,
};

#[derive(Parser)]
#[command(name = "repoherd")]
#[command(about = "Keep a local directory of GitHub clones in sync with their remotes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync all repositories (default when no command is given)
    Sync {
        /// Report what would happen without making changes
        #[arg(long)]
        dry_run: bool,

        /// Answer yes to every commit prompt (non-interactive)
        #[arg(short, long)]
        yes: bool,
    },

    /// List the repositories that would be synced
    List,

    /// Install missing tools and walk through authentication
    Setup,

    /// System health check and diagnostics
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting repoherd v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config)?;

    match cli.command {
        None => cmd_sync(false, false, &config).await,
        Some(Commands::Sync { dry_run, yes }) => cmd_sync(dry_run, yes, &config).await,
        Some(Commands::List) => cmd_list(&config).await,
        Some(Commands::Setup) => cmd_setup(&config).await,
        Some(Commands::Doctor) => cmd_doctor(&config).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Full pipeline: dependencies, authentication, listing, sync
async fn cmd_sync(dry_run: bool, yes: bool, config: &Config) -> Result<()> {
    println!("🔧 Setting up Git & Syncing GitHub Repositories...");

    let installer = DependencyInstaller::new(Platform::detect(), config.install.auto_install);
    installer.ensure_installed(&["git", "gh"]).await?;

    auth::ensure_gh_auth().await?;
    auth::check_ssh_access().await?;

    let prompter: Arc<dyn Prompter> = if yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(TerminalPrompter)
    };

    let username = auth::resolve_username(config, prompter.as_ref()).await?;
    println!("👤 Logged in as: {}", username);

    let lister = GhRepoLister::new(username);
    let repos = lister.list_repositories().await?;

    if repos.is_empty() {
        println!("❌ No repositories found. Nothing to sync.");
        return Ok(());
    }

    let engine = SyncEngine::new(config.clone(), prompter);

    if dry_run {
        println!("\n🔍 Dry run mode - analyzing repository states");
        let plans = engine.analyze(&repos).await?;

        for plan in &plans {
            match plan.action {
                PlannedAction::Clone => {
                    println!("   📥 Would clone: {} -> {}", plan.name, plan.path.display())
                }
                PlannedAction::Pull => println!("   🔄 Would pull: {}", plan.name),
                PlannedAction::PromptThenPull => println!(
                    "   📝 Has uncommitted changes (would prompt): {}",
                    plan.name
                ),
            }
        }

        println!("\n📈 {} repositories analyzed, nothing changed", plans.len());
        return Ok(());
    }

    let summary = engine.sync(repos).await?;
    print_summary(&summary);

    if summary.has_hard_failures() {
        bail!("Synchronization finished with failures");
    }

    println!("🎉 All repositories are synced!");
    Ok(())
}

/// Authenticate and print the repository listing
async fn cmd_list(config: &Config) -> Result<()> {
    auth::ensure_gh_auth().await?;

    let prompter = TerminalPrompter;
    let username = auth::resolve_username(config, &prompter).await?;

    let lister = GhRepoLister::new(username);
    let repos = lister.list_repositories().await?;

    println!("Repositories ({}):", repos.len());
    for repo in &repos {
        println!("  📁 {} -> {}", repo.name, repo.url);
    }

    Ok(())
}

/// Install dependencies and walk through authentication
async fn cmd_setup(config: &Config) -> Result<()> {
    let platform = Platform::detect();
    println!("🖥️  Detected platform: {}", platform.name());

    let installer = DependencyInstaller::new(platform, config.install.auto_install);
    installer.ensure_installed(&["git", "gh"]).await?;

    auth::ensure_gh_auth().await?;
    auth::check_ssh_access().await?;

    println!("✅ repoherd is ready. Run 'repoherd sync' to synchronize.");
    Ok(())
}

/// System health check and diagnostics
async fn cmd_doctor(config: &Config) -> Result<()> {
    let health = HealthCheck::run(config).await;
    print_health_report(&health);

    if !health.all_passed() {
        bail!("Some checks failed");
    }
    Ok(())
}

/// Print the sync summary to stdout
fn print_summary(summary: &SyncSummary) {
    println!("\n📈 Summary:");
    println!("   📊 Total repositories: {}", summary.total_repositories);
    println!("   📥 Cloned: {}", summary.cloned);
    println!("   🔄 Pulled: {}", summary.pulled);
    println!("   ✅ Up to date: {}", summary.up_to_date);
    println!("   ⏭️  Skipped: {}", summary.skipped);
    println!("   ❌ Failed: {}", summary.failed);
    println!("   ⏱️  Duration: {:.2}s", summary.duration.as_secs_f64());

    if summary.failed > 0 {
        println!("\n🔍 Failed repositories:");
        for result in &summary.results {
            if let SyncResult::Failed { path, error, .. } = result {
                println!("   ❌ {}: {}", path.display(), error);
            }
        }
    }
}

/// Print health check report to stdout
fn print_health_report(health: &HealthCheck) {
    println!("🔍 repoherd System Diagnostics");
    println!();

    for (name, result) in health.all_checks() {
        let icon = if result.passed {
            if result.is_warning {
                "⚠️ "
            } else {
                "✅"
            }
        } else {
            "❌"
        };
        println!("{}:", name);
        println!("  {} {}", icon, result.message);
        if let Some(details) = &result.details {
            for line in details.lines() {
                println!("     {}", line);
            }
        }
        println!();
    }

    if health.all_passed() {
        println!("✅ All checks passed");
    } else {
        println!("❌ Some checks failed");
    }
}
