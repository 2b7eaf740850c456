// Test mocks for the sync engine.
//
// One mock per trait boundary:
// - MockCaseReader (CaseReader) — queued per-kind batches, failure injection
// - MockContentWriter (ContentWriter) — stateful in-memory content store
// - MemoryIdentityMap (IdentityMap) — HashMap-backed mapping table
// - MemoryReportStore (ReportStore) — Vec-backed report log
// - FailingFilter (DisclosureFilter) — errors on a marker substring
// - RecordingSink (PublishSink) — captures published entries
//
// Plus constructors for CaseRecord fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use caselight_common::{
    ApprovalState, CaseRecord, Category, CourtHearingRecord, RecordKind, RecordMeta,
    ResourceRecord, SafetyThresholds, TargetEntry, TimelineEventRecord,
};

use crate::report::RunReport;
use crate::sinks::PublishSink;
use crate::traits::{
    CaseReader, ContentWriter, DisclosureFilter, IdentityMap, ReportStore, StandardFilter,
};

// ---------------------------------------------------------------------------
// Record fixtures
// ---------------------------------------------------------------------------

pub fn timeline_event(source_id: &str, significance: u32, body: &str) -> CaseRecord {
    CaseRecord::TimelineEvent(TimelineEventRecord {
        meta: RecordMeta {
            source_id: source_id.to_string(),
            title: format!("Event {source_id}"),
            body: body.to_string(),
            significance,
        },
        occurs_at: Utc::now(),
        event_type: Some("filing".to_string()),
    })
}

pub fn court_hearing(source_id: &str, significance: u32, body: &str) -> CaseRecord {
    CaseRecord::CourtHearing(CourtHearingRecord {
        meta: RecordMeta {
            source_id: source_id.to_string(),
            title: format!("Hearing {source_id}"),
            body: body.to_string(),
            significance,
        },
        starts_at: Utc::now(),
        ends_at: None,
        courtroom: Some("4B".to_string()),
    })
}

pub fn resource(source_id: &str, significance: u32, hint: Option<bool>) -> CaseRecord {
    CaseRecord::Resource(ResourceRecord {
        meta: RecordMeta {
            source_id: source_id.to_string(),
            title: format!("Resource {source_id}"),
            body: "Support resource listing".to_string(),
            significance,
        },
        contact_info: None,
        link: None,
        public_safe_hint: hint,
    })
}

// ---------------------------------------------------------------------------
// MockCaseReader
// ---------------------------------------------------------------------------

/// Queued per-kind batches. Builder pattern: `.with_events()`,
/// `.with_hearings()`, `.with_resources()`, `.failing_fetch()`.
pub struct MockCaseReader {
    events: Vec<CaseRecord>,
    hearings: Vec<CaseRecord>,
    resources: Vec<CaseRecord>,
    fail_kinds: HashSet<RecordKind>,
    fetch_delay: Option<Duration>,
}

impl MockCaseReader {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            hearings: Vec::new(),
            resources: Vec::new(),
            fail_kinds: HashSet::new(),
            fetch_delay: None,
        }
    }

    pub fn with_events(mut self, events: Vec<CaseRecord>) -> Self {
        self.events = events;
        self
    }

    pub fn with_hearings(mut self, hearings: Vec<CaseRecord>) -> Self {
        self.hearings = hearings;
        self
    }

    pub fn with_resources(mut self, resources: Vec<CaseRecord>) -> Self {
        self.resources = resources;
        self
    }

    /// Make fetches for `kind` return an error.
    pub fn failing_fetch(mut self, kind: RecordKind) -> Self {
        self.fail_kinds.insert(kind);
        self
    }

    /// Delay every fetch. Holds a pass open for single-flight tests.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    async fn fetch(&self, kind: RecordKind, batch: &[CaseRecord]) -> Result<Vec<CaseRecord>> {
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_kinds.contains(&kind) {
            bail!("MockCaseReader: fetch failure injected for {kind}");
        }
        Ok(batch.to_vec())
    }
}

impl Default for MockCaseReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaseReader for MockCaseReader {
    async fn fetch_timeline_events(
        &self,
        min_significance: u32,
        limit: u32,
    ) -> Result<Vec<CaseRecord>> {
        let batch = self.fetch(RecordKind::TimelineEvent, &self.events).await?;
        Ok(batch
            .into_iter()
            .filter(|r| r.significance() >= min_significance)
            .take(limit as usize)
            .collect())
    }

    async fn fetch_upcoming_hearings(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<CaseRecord>> {
        self.fetch(RecordKind::CourtHearing, &self.hearings).await
    }

    async fn fetch_resources(&self, limit: u32) -> Result<Vec<CaseRecord>> {
        let batch = self.fetch(RecordKind::Resource, &self.resources).await?;
        Ok(batch.into_iter().take(limit as usize).collect())
    }
}

// ---------------------------------------------------------------------------
// MockContentWriter
// ---------------------------------------------------------------------------

/// A stored entry in the mock content store.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub kind: RecordKind,
    pub source_id: String,
    pub title: String,
    pub body: String,
    pub approval: ApprovalState,
    pub category: Option<Category>,
    pub taxonomy_writes: u32,
}

struct MockContentWriterInner {
    entries: HashMap<u64, StoredEntry>,
    next_id: u64,
    fail_on_create: bool,
    fail_on_update: bool,
    create_calls: u32,
    update_calls: u32,
}

/// Stateful in-memory content store. Thread-safe via interior Mutex.
/// `update` preserves the stored approval state, matching the writer
/// contract.
pub struct MockContentWriter {
    inner: Mutex<MockContentWriterInner>,
}

impl MockContentWriter {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockContentWriterInner {
                entries: HashMap::new(),
                next_id: 100,
                fail_on_create: false,
                fail_on_update: false,
                create_calls: 0,
                update_calls: 0,
            }),
        }
    }

    /// Make `create` return an error for every call.
    pub fn failing_creates(self) -> Self {
        self.inner.lock().unwrap().fail_on_create = true;
        self
    }

    /// Make `update` return an error for every call.
    pub fn failing_updates(self) -> Self {
        self.inner.lock().unwrap().fail_on_update = true;
        self
    }

    /// Operator action: approve an entry. Outside the engine's authority.
    pub fn approve(&self, target_id: u64) {
        if let Some(entry) = self.inner.lock().unwrap().entries.get_mut(&target_id) {
            entry.approval = ApprovalState::Approved;
        }
    }

    /// Operator action: reject an entry.
    pub fn reject(&self, target_id: u64) {
        if let Some(entry) = self.inner.lock().unwrap().entries.get_mut(&target_id) {
            entry.approval = ApprovalState::Rejected;
        }
    }

    pub fn entry(&self, target_id: u64) -> Option<StoredEntry> {
        self.inner.lock().unwrap().entries.get(&target_id).cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn create_calls(&self) -> u32 {
        self.inner.lock().unwrap().create_calls
    }

    pub fn update_calls(&self) -> u32 {
        self.inner.lock().unwrap().update_calls
    }
}

impl Default for MockContentWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentWriter for MockContentWriter {
    async fn create(&self, entry: &TargetEntry) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        inner.create_calls += 1;
        if inner.fail_on_create {
            bail!("MockContentWriter: create failure injected");
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.insert(
            id,
            StoredEntry {
                kind: entry.kind,
                source_id: entry.source_id.clone(),
                title: entry.display_title.clone(),
                body: entry.display_body.clone(),
                approval: entry.approval,
                category: None,
                taxonomy_writes: 0,
            },
        );
        Ok(id)
    }

    async fn update(&self, target_id: u64, entry: &TargetEntry) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.update_calls += 1;
        if inner.fail_on_update {
            bail!("MockContentWriter: update failure injected");
        }
        let stored = inner
            .entries
            .get_mut(&target_id)
            .ok_or_else(|| anyhow::anyhow!("MockContentWriter: no entry {target_id}"))?;
        // Content fields overwritten; approval is operator-owned and stays.
        stored.title = entry.display_title.clone();
        stored.body = entry.display_body.clone();
        Ok(())
    }

    async fn set_taxonomy(&self, target_id: u64, category: Category) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .entries
            .get_mut(&target_id)
            .ok_or_else(|| anyhow::anyhow!("MockContentWriter: no entry {target_id}"))?;
        stored.category = Some(category);
        stored.taxonomy_writes += 1;
        Ok(())
    }

    async fn pending_count(&self) -> Result<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .entries
            .values()
            .filter(|e| e.approval == ApprovalState::Pending)
            .count() as u64)
    }
}

// ---------------------------------------------------------------------------
// MemoryIdentityMap
// ---------------------------------------------------------------------------

/// HashMap-backed identity map. First write wins, matching the store's
/// ON CONFLICT DO NOTHING semantics.
pub struct MemoryIdentityMap {
    inner: Mutex<HashMap<(RecordKind, String), u64>>,
}

impl MemoryIdentityMap {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn mappings(&self) -> Vec<(RecordKind, String, u64)> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .map(|((kind, source_id), target_id)| (*kind, source_id.clone(), *target_id))
            .collect()
    }
}

impl Default for MemoryIdentityMap {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityMap for MemoryIdentityMap {
    async fn lookup(&self, kind: RecordKind, source_id: &str) -> Result<Option<u64>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .get(&(kind, source_id.to_string()))
            .copied())
    }

    async fn record(&self, kind: RecordKind, source_id: &str, target_id: u64) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .entry((kind, source_id.to_string()))
            .or_insert(target_id);
        Ok(())
    }

    async fn mapping_count(&self) -> Result<u64> {
        Ok(self.inner.lock().unwrap().len() as u64)
    }
}

// ---------------------------------------------------------------------------
// MemoryReportStore
// ---------------------------------------------------------------------------

pub struct MemoryReportStore {
    reports: Mutex<Vec<RunReport>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn saved(&self) -> Vec<RunReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl Default for MemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn save(&self, report: &RunReport) -> Result<()> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn last(&self) -> Result<Option<RunReport>> {
        Ok(self.reports.lock().unwrap().last().cloned())
    }

    async fn total_synced(&self) -> Result<u64> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.synced() as u64)
            .sum())
    }
}

// ---------------------------------------------------------------------------
// FailingFilter
// ---------------------------------------------------------------------------

/// Delegates to StandardFilter, but errors on text containing a marker
/// substring. Simulates a per-record filter failure.
pub struct FailingFilter {
    standard: StandardFilter,
    fail_on: String,
}

impl FailingFilter {
    pub fn new(thresholds: SafetyThresholds, fail_on: &str) -> Self {
        Self {
            standard: StandardFilter::new(thresholds),
            fail_on: fail_on.to_string(),
        }
    }
}

impl DisclosureFilter for FailingFilter {
    fn filter_text(&self, text: &str) -> Result<String> {
        if text.contains(&self.fail_on) {
            bail!("FailingFilter: marker '{}' hit", self.fail_on);
        }
        self.standard.filter_text(text)
    }

    fn is_public_safe(&self, text: &str, significance: u32, hint: Option<bool>) -> Result<bool> {
        self.standard.is_public_safe(text, significance, hint)
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Captures the source ids of published entries. `failing()` makes every
/// publish error, for sink-isolation tests.
pub struct RecordingSink {
    published: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublishSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn publish(&self, entry: &TargetEntry) -> Result<()> {
        if self.fail {
            bail!("RecordingSink: publish failure injected");
        }
        self.published.lock().unwrap().push(entry.source_id.clone());
        Ok(())
    }
}
