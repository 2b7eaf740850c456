use anyhow::Result;
use serde::Serialize;

use crate::report::RunReport;
use crate::traits::{ContentWriter, IdentityMap, ReportStore};

/// Point-in-time view for the status dashboard: the last pass plus the
/// cumulative counts the dashboard needs.
#[derive(Debug, Serialize)]
pub struct StatusSnapshot {
    pub last_report: Option<RunReport>,
    pub total_synced: u64,
    pub pending_approval: u64,
    /// Distinct source records ever mirrored (identity-map rows).
    pub tracked_entries: u64,
}

/// Assemble a snapshot. Pending-approval lives in the content store because
/// approval transitions happen there, outside the engine.
pub async fn status_snapshot(
    reports: &dyn ReportStore,
    writer: &dyn ContentWriter,
    identity: &dyn IdentityMap,
) -> Result<StatusSnapshot> {
    Ok(StatusSnapshot {
        last_report: reports.last().await?,
        total_synced: reports.total_synced().await?,
        pending_approval: writer.pending_count().await?,
        tracked_entries: identity.mapping_count().await?,
    })
}
