use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use casefile_client::CasefileClient;
use caselight_common::Config;
use caselight_store::{migrate, SyncStore};
use caselight_sync::engine::SyncEngine;
use caselight_sync::scheduler::run_scheduler;
use caselight_sync::sinks::{CalendarFeedSink, PublishSink};
use caselight_sync::traits::{StandardFilter, WordPressWriter};
use wordpress_client::WordPressClient;

#[derive(Parser)]
#[command(name = "caselight-sync", about = "Case record mirror sync")]
struct Args {
    /// Run a single pass and exit instead of starting the scheduler.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("caselight=info".parse()?))
        .init();

    let args = Args::parse();

    info!("Caselight sync starting...");

    // Load config
    let config = Config::from_env()?;
    config.log_redacted();

    // Connect to Postgres and run migrations
    let store = SyncStore::connect(&config.database_url).await?;
    migrate(store.pool()).await?;

    // Build collaborators
    let reader = CasefileClient::new(&config.casefile_api_url, &config.casefile_api_token);
    let writer = WordPressWriter::new(WordPressClient::new(
        &config.wordpress_url,
        &config.wordpress_user,
        &config.wordpress_app_password,
    ));
    let filter = StandardFilter::new(config.sync.thresholds());

    let mut engine = SyncEngine::new(
        Arc::new(reader),
        Arc::new(writer),
        Arc::new(store.clone()),
        Arc::new(store),
        Arc::new(filter),
        config.sync.clone(),
    );

    // Optional calendar sink
    if let Some(webhook_url) = &config.calendar_webhook_url {
        info!("Calendar feed sink enabled");
        let sink: Arc<dyn PublishSink> = Arc::new(CalendarFeedSink::new(webhook_url));
        engine = engine.with_sink(sink);
    }

    if args.once {
        let report = engine.run().await?;
        info!("Sync pass complete. {report}");
        return Ok(());
    }

    run_scheduler(Arc::new(engine)).await;

    Ok(())
}
