// Trait abstractions for the sync engine's dependencies.
//
// CaseReader — read-only access to the case-management system.
// ContentWriter — create/update/taxonomy against the content store.
// IdentityMap — durable (kind, source_id) → target_id bookkeeping.
// ReportStore — run report persistence and dashboard queries.
// DisclosureFilter — redaction + publication-safety classification.
//
// These enable deterministic testing with the mocks in `testing`:
// no network, no database. `cargo test` in seconds.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use casefile_client::CasefileClient;
use caselight_common::{
    is_public_safe, redact, ApprovalState, CaseRecord, Category, CourtHearingRecord, RecordKind,
    RecordMeta, ResourceRecord, SafetyThresholds, TargetEntry, TimelineEventRecord,
};
use caselight_store::{StoredReport, SyncStore};
use wordpress_client::{NewPost, PostUpdate, WordPressClient};

use crate::report::RunReport;

// ---------------------------------------------------------------------------
// CaseReader — upstream system of record
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CaseReader: Send + Sync {
    /// Fetch timeline events at or above the significance threshold.
    async fn fetch_timeline_events(
        &self,
        min_significance: u32,
        limit: u32,
    ) -> Result<Vec<CaseRecord>>;

    /// Fetch hearings scheduled within the window.
    async fn fetch_upcoming_hearings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CaseRecord>>;

    /// Fetch support resources.
    async fn fetch_resources(&self, limit: u32) -> Result<Vec<CaseRecord>>;
}

#[async_trait]
impl CaseReader for CasefileClient {
    async fn fetch_timeline_events(
        &self,
        min_significance: u32,
        limit: u32,
    ) -> Result<Vec<CaseRecord>> {
        let events = self.timeline_events(min_significance, limit).await?;
        Ok(events
            .into_iter()
            .map(|dto| {
                CaseRecord::TimelineEvent(TimelineEventRecord {
                    meta: RecordMeta {
                        source_id: dto.id,
                        title: dto.title,
                        body: dto.body,
                        significance: dto.significance,
                    },
                    occurs_at: dto.occurs_at,
                    event_type: dto.event_type,
                })
            })
            .collect())
    }

    async fn fetch_upcoming_hearings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CaseRecord>> {
        let hearings = self.upcoming_hearings(start, end).await?;
        Ok(hearings
            .into_iter()
            .map(|dto| {
                CaseRecord::CourtHearing(CourtHearingRecord {
                    meta: RecordMeta {
                        source_id: dto.id,
                        title: dto.title,
                        body: dto.body,
                        significance: dto.significance,
                    },
                    starts_at: dto.starts_at,
                    ends_at: dto.ends_at,
                    courtroom: dto.courtroom,
                })
            })
            .collect())
    }

    async fn fetch_resources(&self, limit: u32) -> Result<Vec<CaseRecord>> {
        let resources = self.resources(limit).await?;
        Ok(resources
            .into_iter()
            .map(|dto| {
                CaseRecord::Resource(ResourceRecord {
                    meta: RecordMeta {
                        source_id: dto.id,
                        title: dto.title,
                        body: dto.body,
                        significance: dto.significance,
                    },
                    contact_info: dto.contact_info,
                    link: dto.link,
                    public_safe_hint: dto.public_safe,
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// ContentWriter — target content store
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ContentWriter: Send + Sync {
    /// Create an entry. Returns the id assigned by the content store.
    async fn create(&self, entry: &TargetEntry) -> Result<u64>;

    /// Overwrite an entry's content fields. Implementations must leave the
    /// entry's approval state untouched; it belongs to the operators.
    async fn update(&self, target_id: u64, entry: &TargetEntry) -> Result<()>;

    /// Assign the derived taxonomy tag. Reapplied on every pass.
    async fn set_taxonomy(&self, target_id: u64, category: Category) -> Result<()>;

    /// Number of entries awaiting operator review (status surface).
    async fn pending_count(&self) -> Result<u64>;
}

/// ContentWriter over the WordPress REST API. Resolves taxonomy slugs to
/// category ids lazily and caches them for the life of the process.
pub struct WordPressWriter {
    client: WordPressClient,
    category_ids: tokio::sync::Mutex<HashMap<Category, u64>>,
}

impl WordPressWriter {
    pub fn new(client: WordPressClient) -> Self {
        Self {
            client,
            category_ids: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// WordPress post status for an approval state. Rejected entries are
    /// parked as drafts so operators can still see them in the admin.
    fn status_for(approval: ApprovalState) -> &'static str {
        match approval {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "publish",
            ApprovalState::Rejected => "draft",
        }
    }

    async fn category_id(&self, category: Category) -> Result<u64> {
        let mut cache = self.category_ids.lock().await;
        if let Some(id) = cache.get(&category) {
            return Ok(*id);
        }
        let id = self
            .client
            .ensure_category(category.slug(), &display_name(category))
            .await?;
        cache.insert(category, id);
        Ok(id)
    }
}

fn display_name(category: Category) -> String {
    match category {
        Category::KeyEvidence => "Key Evidence".to_string(),
        Category::CaseTimeline => "Case Timeline".to_string(),
        Category::Hearings => "Hearings".to_string(),
        Category::Resources => "Resources".to_string(),
    }
}

#[async_trait]
impl ContentWriter for WordPressWriter {
    async fn create(&self, entry: &TargetEntry) -> Result<u64> {
        let post = NewPost {
            title: entry.display_title.clone(),
            content: entry.display_body.clone(),
            status: Self::status_for(entry.approval).to_string(),
            date_gmt: entry.occurs_at.map(|t| t.to_rfc3339()),
        };
        Ok(self.client.create_post(&post).await?)
    }

    async fn update(&self, target_id: u64, entry: &TargetEntry) -> Result<()> {
        // PostUpdate carries no status field, so the editor-owned
        // publish/pending state survives the overwrite.
        let update = PostUpdate {
            title: entry.display_title.clone(),
            content: entry.display_body.clone(),
            date_gmt: entry.occurs_at.map(|t| t.to_rfc3339()),
        };
        Ok(self.client.update_post(target_id, &update).await?)
    }

    async fn set_taxonomy(&self, target_id: u64, category: Category) -> Result<()> {
        let category_id = self.category_id(category).await?;
        Ok(self.client.set_categories(target_id, &[category_id]).await?)
    }

    async fn pending_count(&self) -> Result<u64> {
        Ok(self.client.count_posts_by_status("pending").await?)
    }
}

// ---------------------------------------------------------------------------
// IdentityMap — durable source → target correspondence
// ---------------------------------------------------------------------------

#[async_trait]
pub trait IdentityMap: Send + Sync {
    /// The target id previously created for this record, if any.
    async fn lookup(&self, kind: RecordKind, source_id: &str) -> Result<Option<u64>>;

    /// Record a mapping. Called only after a confirmed create, never
    /// speculatively.
    async fn record(&self, kind: RecordKind, source_id: &str, target_id: u64) -> Result<()>;

    async fn mapping_count(&self) -> Result<u64>;
}

#[async_trait]
impl IdentityMap for SyncStore {
    async fn lookup(&self, kind: RecordKind, source_id: &str) -> Result<Option<u64>> {
        self.lookup_mapping(kind, source_id).await
    }

    async fn record(&self, kind: RecordKind, source_id: &str, target_id: u64) -> Result<()> {
        self.record_mapping(kind, source_id, target_id).await
    }

    async fn mapping_count(&self) -> Result<u64> {
        SyncStore::mapping_count(self).await
    }
}

// ---------------------------------------------------------------------------
// ReportStore — run report persistence
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save(&self, report: &RunReport) -> Result<()>;

    /// Most recent report, for the status surface.
    async fn last(&self) -> Result<Option<RunReport>>;

    /// Cumulative synced count across all passes.
    async fn total_synced(&self) -> Result<u64>;
}

#[async_trait]
impl ReportStore for SyncStore {
    async fn save(&self, report: &RunReport) -> Result<()> {
        let stored = StoredReport {
            run_id: report.run_id,
            started_at: report.started_at,
            finished_at: report.finished_at,
            synced: report.synced() as i64,
            skipped: report.skipped() as i64,
            errored: report.errored() as i64,
            fatal_error: report.fatal_error.clone(),
            payload: serde_json::to_value(report)?,
        };
        self.save_report(&stored).await
    }

    async fn last(&self) -> Result<Option<RunReport>> {
        match self.last_report().await? {
            Some(stored) => Ok(Some(serde_json::from_value(stored.payload)?)),
            None => Ok(None),
        }
    }

    async fn total_synced(&self) -> Result<u64> {
        SyncStore::total_synced(self).await
    }
}

// ---------------------------------------------------------------------------
// DisclosureFilter — redaction + safety classification
// ---------------------------------------------------------------------------

pub trait DisclosureFilter: Send + Sync {
    /// Redact free text for public display. Must be idempotent.
    fn filter_text(&self, text: &str) -> Result<String>;

    /// Classify filtered text as publication-safe.
    fn is_public_safe(&self, text: &str, significance: u32, hint: Option<bool>) -> Result<bool>;
}

/// The production filter: pure regex redaction and threshold classification
/// from `caselight_common::safety`.
pub struct StandardFilter {
    thresholds: SafetyThresholds,
}

impl StandardFilter {
    pub fn new(thresholds: SafetyThresholds) -> Self {
        Self { thresholds }
    }
}

impl DisclosureFilter for StandardFilter {
    fn filter_text(&self, text: &str) -> Result<String> {
        Ok(redact(text))
    }

    fn is_public_safe(&self, text: &str, significance: u32, hint: Option<bool>) -> Result<bool> {
        Ok(is_public_safe(text, significance, hint, &self.thresholds))
    }
}
