// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use git_mirror::utils::logging;
use git_mirror::{Config, SyncEngine, server, sync::scheduler, version};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "git_mirror")]
#[command(version = version::VERSION)]
#[command(about = "Periodic git repository mirroring service", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the initial sync, then serve health endpoints and sync on schedule
    Serve,

    /// Perform exactly one sync cycle and exit
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logger(cli.color, cli.verbose);

    info!(
        "{} {} (commit: {}, built: {})",
        version::NAME,
        version::VERSION,
        version::git_commit(),
        version::build_date()
    );

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using environment configuration",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(config).await,
        Commands::Sync => cmd_sync(config).await,
    }
}

async fn cmd_sync(config: Config) -> Result<()> {
    let engine = Arc::new(SyncEngine::new(config).context("Failed to initialize sync engine")?);

    match run_blocking_cycle(&engine).await {
        Ok(revision) => {
            println!(
                "{}",
                logging::format_success(&format!("Synced revision {}", revision))
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", logging::format_error("Sync failed"));
            Err(e)
        }
    }
}

async fn cmd_serve(config: Config) -> Result<()> {
    info!(
        "Mirroring {} (branch: {}) to {}",
        config.repository.url,
        config.repository.branch,
        config.mirror.target_path.display()
    );
    // The mirror is additive: files removed upstream stay in the target.
    info!("Upstream deletions are not propagated to the target");

    let run_once = config.schedule.run_once;
    let cron = config.schedule.cron.clone();
    let port = config.server.port;

    let engine = Arc::new(SyncEngine::new(config).context("Failed to initialize sync engine")?);

    info!("Performing initial sync");
    run_blocking_cycle(&engine).await.context("Initial sync failed")?;

    if run_once {
        info!("Run-once mode enabled, exiting after initial sync");
        return Ok(());
    }

    let mut scheduler = scheduler::start(Arc::clone(&engine), &cron)
        .await
        .context("Failed to schedule sync")?;

    server::serve(engine, port).await.context("HTTP server error")?;

    scheduler.shutdown().await.ok();
    info!("Shut down gracefully");

    Ok(())
}

async fn run_blocking_cycle(engine: &Arc<SyncEngine>) -> Result<String> {
    let engine = Arc::clone(engine);
    let revision = tokio::task::spawn_blocking(move || engine.run_cycle())
        .await
        .context("Sync task panicked")??;
    Ok(revision)
}
