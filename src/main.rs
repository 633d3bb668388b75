use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use repricer::config::AppConfig;
use repricer::fetcher::RemoteCatalog;
use repricer::matcher::ProductMatcher;
use repricer::reconciler::Reconciler;
use repricer::scheduler::ReconcileScheduler;
use repricer::store::SqliteCatalogStore;

#[derive(Parser)]
#[command(name = "repricer", version, about = "Reconciles catalog prices against the remote price-monitoring service")]
struct Cli {
    /// Run one reconciliation immediately and exit instead of scheduling.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("repricer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let store = SqliteCatalogStore::connect(&config.database).await?;
    store.init_schema().await?;
    let remote = RemoteCatalog::new(config.remote.clone())?;
    let matcher = ProductMatcher::new(config.matcher.strategies.clone());
    let reconciler = Reconciler::new(store, remote, matcher, config.reconciler.clone());

    if cli.once {
        // Record-level failures are part of the summary, not the exit code;
        // only a whole-run failure propagates out of here.
        let report = reconciler.run().await?;
        print!("{report}");
        return Ok(());
    }

    info!("Starting repricer...");
    let mut scheduler =
        ReconcileScheduler::new(Arc::new(reconciler), config.scheduler.clone()).await?;
    scheduler.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    scheduler.shutdown().await?;

    Ok(())
}
