use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ghmon::{Config, GitHubClient, Monitor, Notifier, Settings};

#[derive(Parser)]
#[command(name = "ghmon")]
#[command(
    about = "A tool to monitor a GitHub organization and its members' public repositories and notify on a chat webhook"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// GitHub organization name (required)
    #[arg(short, long, global = true)]
    org: Option<String>,

    /// Chat webhook URL (reports are printed when omitted)
    #[arg(short, long, global = true)]
    webhook: Option<String>,

    /// GitHub personal access token
    #[arg(short, long, env = "GITHUB_PAT", hide_env_values = true, global = true)]
    pat: Option<String>,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List users or repositories
    List {
        /// List all members of the organization
        #[arg(short, long)]
        users: bool,

        /// List all repositories in the organization and members' public repositories
        #[arg(short, long)]
        repos: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.logging.level)?;
    info!("Starting ghmon v{}", env!("CARGO_PKG_VERSION"));

    let list = match cli.command {
        Some(Commands::List { users, repos }) => {
            if !users && !repos {
                print_usage_and_exit(Cli::command().find_subcommand("list").cloned());
            }
            Some((users, repos))
        }
        None => None,
    };

    if config.resolve_org(cli.org.clone()).is_none() {
        print_usage_and_exit(None);
    }

    let settings = config.settings(cli.org, cli.webhook, cli.pat)?;
    let monitor = build_monitor(&settings)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match list {
        Some((users, repos)) => cmd_list(&monitor, &settings, users, repos, &mut out).await,
        None => cmd_run(&monitor, &settings, &mut out).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn print_usage_and_exit(command: Option<clap::Command>) -> ! {
    let mut command = command.unwrap_or_else(Cli::command);
    let _ = command.write_help(&mut std::io::stderr());
    std::process::exit(2);
}

fn build_monitor(settings: &Settings) -> Result<Monitor<GitHubClient>> {
    let client = GitHubClient::new(&settings.api_url, &settings.token, settings.timeout)?;
    let notifier = Notifier::new(settings.webhook_url.clone(), settings.timeout)?;

    Ok(Monitor::new(client, notifier, settings.max_parallel))
}

/// Check for recently updated repositories and report them
async fn cmd_run(
    monitor: &Monitor<GitHubClient>,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<()> {
    let summary = monitor.run(&settings.org, out).await?;

    info!(
        updated = summary.updated.len(),
        member_failures = summary.member_failures.len(),
        delivery = ?summary.delivery,
        "Run complete"
    );

    Ok(())
}

/// List organization members and/or repositories
async fn cmd_list(
    monitor: &Monitor<GitHubClient>,
    settings: &Settings,
    users: bool,
    repos: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if users {
        let _ = writeln!(out, "Listing users...");
        monitor.list_members(&settings.org, out).await?;
    }

    if repos {
        let _ = writeln!(out, "Listing all repositories...");
        monitor.list_repositories(&settings.org, out).await?;
    }

    Ok(())
}
