use anyhow::Result;
use sqlx::PgPool;

use caselight_common::RecordKind;

// ---------------------------------------------------------------------------
// SyncStore
// ---------------------------------------------------------------------------

/// Postgres-backed persistence for the sync engine: identity mappings and
/// run reports.
#[derive(Clone)]
pub struct SyncStore {
    pool: PgPool,
}

impl SyncStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Look up the target entry id for a source record, if one was ever
    /// created.
    pub async fn lookup_mapping(
        &self,
        kind: RecordKind,
        source_id: &str,
    ) -> Result<Option<u64>> {
        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            SELECT target_id
            FROM identity_mappings
            WHERE kind = $1 AND source_id = $2
            "#,
        )
        .bind(kind.to_string())
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id,)| id as u64))
    }

    /// Record a mapping after a confirmed create. The composite primary key
    /// and the unique target_id index enforce at-most-one in both
    /// directions; a duplicate insert is a no-op.
    pub async fn record_mapping(
        &self,
        kind: RecordKind,
        source_id: &str,
        target_id: u64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO identity_mappings (kind, source_id, target_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (kind, source_id) DO NOTHING
            "#,
        )
        .bind(kind.to_string())
        .bind(source_id)
        .bind(target_id as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mapping_count(&self) -> Result<u64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM identity_mappings")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }
}
