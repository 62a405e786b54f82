use anyhow::Context;
use clap::Parser;
use feed_poster::config::DEFAULT_CONFIG_FILE;
use feed_poster::{read_config, HttpFeedSource, MastodonPublisher, RunCoordinator, RunOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};

#[derive(Debug, Parser)]
#[command(version, about = "Post fresh feed items to Mastodon-compatible accounts")]
struct Cli {
    /// The configuration file to use
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Publish without recording the run, so the next run sees the same items
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging, and reprocess items older than the last run
    #[arg(long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("{}", cli.config.display());
    info!("feed-poster starting up...");

    let mut config = read_config(&cli.config)
        .with_context(|| format!("Failed to read config {}", cli.config.display()))?;

    info!("Version: {}", config.meta.version);
    info!("Build time: {}", config.meta.buildtime);

    let source = HttpFeedSource::new(config.fetch.clone())?;
    let publisher = MastodonPublisher::new(&config.fetch.user_agent, config.fetch.timeout_seconds)?;

    let options = RunOptions {
        dry_run: cli.dry_run,
        debug: cli.debug,
    };
    let coordinator = RunCoordinator::new(Arc::new(source), Arc::new(publisher), options);

    let summary = coordinator.run(&mut config).await?;

    info!(
        "Run finished: {} account(s), {} feed(s) fetched, {} failed, {} empty, {} stale, {} too close, {} published",
        summary.accounts,
        summary.stats.feeds_fetched,
        summary.stats.feeds_failed,
        summary.stats.feeds_empty,
        summary.stats.items_stale,
        summary.stats.items_too_close,
        summary.stats.published
    );
    if summary.state_advanced {
        info!("Last updated time saved to {}", config.path().display());
    }
    Ok(())
}
