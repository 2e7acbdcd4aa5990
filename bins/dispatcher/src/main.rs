//! Atrium outbox dispatcher.
//!
//! Long-running worker that polls the event outbox and delivers staged
//! events to the configured sink. Safe to run alongside other
//! dispatcher processes; claims are leased per event.

use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atrium_db::connect;
use atrium_db::repositories::dispatcher::{DispatchReport, Dispatcher, LoggingSink};
use atrium_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let dispatcher = Dispatcher::from_config(db, &config.dispatcher);
    let sink = LoggingSink;

    info!(
        batch_size = config.dispatcher.batch_size,
        poll_interval_secs = config.dispatcher.poll_interval_secs,
        max_retries = config.dispatcher.max_retries,
        "Dispatcher started"
    );

    let mut ticker = interval(Duration::from_secs(config.dispatcher.poll_interval_secs.max(1)));
    loop {
        ticker.tick().await;

        match dispatcher.dispatch_batch(&sink).await {
            Ok(report) => {
                if report != DispatchReport::default() {
                    info!(
                        published = report.published,
                        failed = report.failed,
                        exhausted = report.exhausted,
                        skipped = report.skipped,
                        "Dispatch batch complete"
                    );
                }
            }
            Err(err) => {
                // Transient database trouble; keep polling.
                error!(error = %err, "Dispatch batch failed");
            }
        }
    }
}
