use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::identity::SyncStore;

// ---------------------------------------------------------------------------
// StoredReport
// ---------------------------------------------------------------------------

/// A persisted run report row. `payload` holds the full serialized report;
/// the scalar columns exist for the dashboard's aggregate queries.
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub synced: i64,
    pub skipped: i64,
    pub errored: i64,
    pub fatal_error: Option<String>,
    pub payload: serde_json::Value,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredReport {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(StoredReport {
            run_id: row.try_get("run_id")?,
            started_at: row.try_get("started_at")?,
            finished_at: row.try_get("finished_at")?,
            synced: row.try_get("synced")?,
            skipped: row.try_get("skipped")?,
            errored: row.try_get("errored")?,
            fatal_error: row.try_get("fatal_error")?,
            payload: row.try_get("payload")?,
        })
    }
}

impl SyncStore {
    /// Persist a run report. Reports are immutable once written.
    pub async fn save_report(&self, report: &StoredReport) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO run_reports
                (run_id, started_at, finished_at, synced, skipped, errored, fatal_error, payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (run_id) DO NOTHING
            "#,
        )
        .bind(report.run_id)
        .bind(report.started_at)
        .bind(report.finished_at)
        .bind(report.synced)
        .bind(report.skipped)
        .bind(report.errored)
        .bind(&report.fatal_error)
        .bind(&report.payload)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// The most recent report, for the status dashboard.
    pub async fn last_report(&self) -> Result<Option<StoredReport>> {
        let row = sqlx::query_as::<_, StoredReport>(
            r#"
            SELECT run_id, started_at, finished_at, synced, skipped, errored, fatal_error, payload
            FROM run_reports
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Cumulative synced count across all recorded passes.
    pub async fn total_synced(&self) -> Result<u64> {
        let row = sqlx::query_as::<_, (Option<i64>,)>("SELECT SUM(synced) FROM run_reports")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0.unwrap_or(0) as u64)
    }
}
