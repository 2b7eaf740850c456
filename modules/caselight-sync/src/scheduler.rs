use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use caselight_common::CaselightError;

use crate::engine::SyncEngine;

/// Run the engine on a fixed period, forever. A tick that finds a pass
/// still in flight is skipped, never stacked.
pub async fn run_scheduler(engine: Arc<SyncEngine>) {
    let period = Duration::from_secs(engine.config().interval_minutes * 60);
    info!(
        interval_minutes = engine.config().interval_minutes,
        "Starting sync scheduler"
    );

    loop {
        match engine.run().await {
            Ok(report) => {
                info!(
                    run_id = %report.run_id,
                    synced = report.synced(),
                    skipped = report.skipped(),
                    errored = report.errored(),
                    "Scheduled pass complete"
                );
            }
            Err(CaselightError::SyncInProgress) => {
                info!("Previous pass still running, skipping tick");
            }
            Err(e) => {
                error!(error = %e, "Scheduled pass failed");
            }
        }

        tokio::time::sleep(period).await;
    }
}
