use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

/// Run idempotent schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("Running schema migrations...");

    // Identity map: one row per (kind, source_id), each target claimed once.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS identity_mappings (
            kind        TEXT        NOT NULL,
            source_id   TEXT        NOT NULL,
            target_id   BIGINT      NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (kind, source_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS identity_mappings_target_id_key
        ON identity_mappings (target_id)
        "#,
    )
    .execute(pool)
    .await?;

    // Run reports, newest first by started_at. Payload keeps the full report
    // so the dashboard can render per-kind breakdowns without schema churn.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS run_reports (
            run_id       UUID        PRIMARY KEY,
            started_at   TIMESTAMPTZ NOT NULL,
            finished_at  TIMESTAMPTZ NOT NULL,
            synced       BIGINT      NOT NULL,
            skipped      BIGINT      NOT NULL,
            errored      BIGINT      NOT NULL,
            fatal_error  TEXT,
            payload      JSONB       NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS run_reports_started_at_idx
        ON run_reports (started_at DESC)
        "#,
    )
    .execute(pool)
    .await?;

    info!("Schema migrations complete");
    Ok(())
}
