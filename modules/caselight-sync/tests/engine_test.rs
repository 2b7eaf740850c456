//! Sync engine tests: mocked reader/writer/identity map, real filter.
//!
//! Each test: queue records → run() → assert report counters plus the
//! content-store and identity-map state. No network, no database.

use std::sync::Arc;
use std::time::Duration;

use caselight_common::{ApprovalState, CaselightError, Category, RecordKind, SyncConfig};
use caselight_sync::engine::SyncEngine;
use caselight_sync::sinks::{NoopSink, PublishSink};
use caselight_sync::testing::{
    court_hearing, resource, timeline_event, FailingFilter, MemoryIdentityMap, MemoryReportStore,
    MockCaseReader, MockContentWriter, RecordingSink,
};
use caselight_sync::traits::{DisclosureFilter, IdentityMap, StandardFilter};

struct Harness {
    writer: Arc<MockContentWriter>,
    identity: Arc<MemoryIdentityMap>,
    reports: Arc<MemoryReportStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            writer: Arc::new(MockContentWriter::new()),
            identity: Arc::new(MemoryIdentityMap::new()),
            reports: Arc::new(MemoryReportStore::new()),
        }
    }

    fn engine(&self, reader: MockCaseReader, config: SyncConfig) -> SyncEngine {
        let filter = StandardFilter::new(config.thresholds());
        self.engine_with_filter(reader, config, Arc::new(filter))
    }

    fn engine_with_filter(
        &self,
        reader: MockCaseReader,
        config: SyncConfig,
        filter: Arc<dyn DisclosureFilter>,
    ) -> SyncEngine {
        SyncEngine::new(
            Arc::new(reader),
            self.writer.clone(),
            self.identity.clone(),
            self.reports.clone(),
            filter,
            config,
        )
    }

    /// The single entry's target id, for tests that sync exactly one record.
    fn sole_target_id(&self) -> u64 {
        let mappings = self.identity.mappings();
        assert_eq!(mappings.len(), 1, "expected exactly one mapping");
        mappings[0].2
    }
}

// ---------------------------------------------------------------------------
// Create path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_sync_creates_pending_entry_with_redacted_body() {
    let h = Harness::new();
    let reader = MockCaseReader::new().with_events(vec![timeline_event(
        "ev-1",
        950,
        "Contains John Smith's home address at 1423 Maple Grove Ave",
    )]);

    let report = h.engine(reader, SyncConfig::default()).run().await.unwrap();

    assert_eq!(report.timeline_events.synced, 1);
    assert_eq!(report.errored(), 0);

    let entry = h.writer.entry(h.sole_target_id()).unwrap();
    assert_eq!(entry.approval, ApprovalState::Pending);
    assert!(!entry.body.contains("1423 Maple Grove Ave"));
    assert!(entry.body.contains("[redacted]"));
    assert_eq!(entry.category, Some(Category::KeyEvidence));
}

#[tokio::test]
async fn auto_publish_creates_approved_entries() {
    let h = Harness::new();
    let reader =
        MockCaseReader::new().with_events(vec![timeline_event("ev-1", 500, "Routine order")]);
    let config = SyncConfig {
        auto_publish: true,
        ..SyncConfig::default()
    };

    h.engine(reader, config).run().await.unwrap();

    let entry = h.writer.entry(h.sole_target_id()).unwrap();
    assert_eq!(entry.approval, ApprovalState::Approved);
}

#[tokio::test]
async fn all_kinds_processed_in_one_pass() {
    let h = Harness::new();
    let reader = MockCaseReader::new()
        .with_events(vec![timeline_event("ev-1", 500, "Order entered")])
        .with_hearings(vec![court_hearing("hr-1", 600, "Status conference")])
        .with_resources(vec![resource("res-1", 400, Some(true))]);

    let report = h.engine(reader, SyncConfig::default()).run().await.unwrap();

    assert_eq!(report.synced(), 3);
    assert_eq!(h.writer.entry_count(), 3);
    assert_eq!(h.identity.mapping_count().await.unwrap(), 3);
}

// ---------------------------------------------------------------------------
// Update path: idempotent re-sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resync_reuses_target_id_and_updates_body() {
    let h = Harness::new();
    let config = SyncConfig::default();

    let reader = MockCaseReader::new().with_events(vec![timeline_event(
        "ev-1",
        700,
        "Original body text",
    )]);
    h.engine(reader, config.clone()).run().await.unwrap();
    let target_id = h.sole_target_id();

    // Upstream edits the body; the next pass must update, not duplicate.
    let reader = MockCaseReader::new().with_events(vec![timeline_event(
        "ev-1",
        700,
        "Amended body text",
    )]);
    let report = h.engine(reader, config).run().await.unwrap();

    assert_eq!(report.timeline_events.synced, 1);
    assert_eq!(h.writer.entry_count(), 1);
    assert_eq!(h.writer.create_calls(), 1);
    assert_eq!(h.identity.mapping_count().await.unwrap(), 1);
    assert_eq!(h.sole_target_id(), target_id);

    let entry = h.writer.entry(target_id).unwrap();
    assert!(entry.body.contains("Amended"));
}

#[tokio::test]
async fn resync_preserves_operator_approval() {
    let h = Harness::new();
    let config = SyncConfig::default();

    let reader =
        MockCaseReader::new().with_events(vec![timeline_event("ev-1", 700, "First version")]);
    h.engine(reader, config.clone()).run().await.unwrap();
    let target_id = h.sole_target_id();

    // An editor approves the entry between passes.
    h.writer.approve(target_id);

    let reader =
        MockCaseReader::new().with_events(vec![timeline_event("ev-1", 700, "Second version")]);
    h.engine(reader, config.clone()).run().await.unwrap();

    let entry = h.writer.entry(target_id).unwrap();
    assert_eq!(entry.approval, ApprovalState::Approved);
    assert!(entry.body.contains("Second"));

    // Same for rejected; terminal states are never reverted by a sync.
    h.writer.reject(target_id);
    let reader =
        MockCaseReader::new().with_events(vec![timeline_event("ev-1", 700, "Third version")]);
    h.engine(reader, config).run().await.unwrap();
    assert_eq!(
        h.writer.entry(target_id).unwrap().approval,
        ApprovalState::Rejected
    );
}

#[tokio::test]
async fn taxonomy_reassigned_on_every_pass() {
    let h = Harness::new();
    let config = SyncConfig::default();

    for _ in 0..2 {
        let reader =
            MockCaseReader::new().with_events(vec![timeline_event("ev-1", 850, "Key exhibit")]);
        h.engine(reader, config.clone()).run().await.unwrap();
    }

    let entry = h.writer.entry(h.sole_target_id()).unwrap();
    assert_eq!(entry.taxonomy_writes, 2);
    assert_eq!(entry.category, Some(Category::KeyEvidence));
}

// ---------------------------------------------------------------------------
// Safety gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsafe_record_never_written_and_never_mapped() {
    let h = Harness::new();
    // Below the significance floor, never publishable.
    let reader =
        MockCaseReader::new().with_hearings(vec![court_hearing("hr-1", 100, "Low weight")]);

    let report = h.engine(reader, SyncConfig::default()).run().await.unwrap();

    assert_eq!(report.court_hearings.skipped, 1);
    assert_eq!(h.writer.entry_count(), 0);
    assert_eq!(h.identity.mapping_count().await.unwrap(), 0);
}

#[tokio::test]
async fn hint_false_resource_always_skipped() {
    let h = Harness::new();
    let reader = MockCaseReader::new().with_resources(vec![resource("res-1", 1000, Some(false))]);

    let report = h.engine(reader, SyncConfig::default()).run().await.unwrap();

    assert_eq!(report.resources.skipped, 1);
    assert_eq!(h.writer.entry_count(), 0);
}

#[tokio::test]
async fn mid_band_record_with_sensitive_marker_skipped() {
    let h = Harness::new();
    let reader = MockCaseReader::new().with_hearings(vec![court_hearing(
        "hr-1",
        500,
        "Testimony concerns a minor child",
    )]);

    let report = h.engine(reader, SyncConfig::default()).run().await.unwrap();

    assert_eq!(report.court_hearings.skipped, 1);
    assert_eq!(h.writer.entry_count(), 0);
}

// ---------------------------------------------------------------------------
// Error isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filter_error_on_one_record_does_not_abort_batch() {
    let h = Harness::new();
    let mut events = Vec::new();
    for i in 1..=10 {
        let body = if i == 5 {
            "poison pill body".to_string()
        } else {
            format!("Order {i} entered")
        };
        events.push(timeline_event(&format!("ev-{i}"), 600, &body));
    }
    let reader = MockCaseReader::new().with_events(events);
    let config = SyncConfig::default();
    let filter = Arc::new(FailingFilter::new(config.thresholds(), "poison"));

    let report = h
        .engine_with_filter(reader, config, filter)
        .run()
        .await
        .unwrap();

    assert_eq!(report.timeline_events.synced, 9);
    assert_eq!(report.timeline_events.errored, 1);
    assert_eq!(h.writer.entry_count(), 9);
}

#[tokio::test]
async fn fetch_failure_isolated_to_its_kind() {
    let h = Harness::new();
    let reader = MockCaseReader::new()
        .failing_fetch(RecordKind::TimelineEvent)
        .with_hearings(vec![court_hearing("hr-1", 600, "Status conference")]);

    let report = h.engine(reader, SyncConfig::default()).run().await.unwrap();

    assert!(report.timeline_events.fetch_error.is_some());
    assert_eq!(report.timeline_events.synced, 0);
    assert_eq!(report.court_hearings.synced, 1);
    assert!(report.fatal_error.is_none());
}

#[tokio::test]
async fn create_failure_leaves_no_identity_mapping() {
    let h = Harness::new();
    let writer = Arc::new(MockContentWriter::new().failing_creates());
    let reader =
        MockCaseReader::new().with_events(vec![timeline_event("ev-1", 600, "Order entered")]);
    let config = SyncConfig::default();
    let engine = SyncEngine::new(
        Arc::new(reader),
        writer.clone(),
        h.identity.clone(),
        h.reports.clone(),
        Arc::new(StandardFilter::new(config.thresholds())),
        config,
    );

    let report = engine.run().await.unwrap();

    assert_eq!(report.timeline_events.errored, 1);
    assert_eq!(h.identity.mapping_count().await.unwrap(), 0);
}

#[tokio::test]
async fn update_failure_counts_errored_but_keeps_mapping() {
    let h = Harness::new();
    let config = SyncConfig::default();

    let reader = MockCaseReader::new().with_events(vec![timeline_event("ev-1", 600, "v1")]);
    h.engine(reader, config.clone()).run().await.unwrap();
    let target_id = h.sole_target_id();

    let writer_failing = {
        // Same identity map, fresh failing writer: the update call errors
        // but the mapping must survive for the next pass.
        let reader = MockCaseReader::new().with_events(vec![timeline_event("ev-1", 600, "v2")]);
        let writer = Arc::new(MockContentWriter::new().failing_updates());
        let engine = SyncEngine::new(
            Arc::new(reader),
            writer.clone(),
            h.identity.clone(),
            h.reports.clone(),
            Arc::new(StandardFilter::new(config.thresholds())),
            config,
        );
        let report = engine.run().await.unwrap();
        assert_eq!(report.timeline_events.errored, 1);
        writer
    };

    assert_eq!(writer_failing.create_calls(), 0);
    assert_eq!(h.identity.mapping_count().await.unwrap(), 1);
    assert_eq!(h.sole_target_id(), target_id);
}

// ---------------------------------------------------------------------------
// Fatal config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_config_aborts_before_any_record() {
    let h = Harness::new();
    let reader =
        MockCaseReader::new().with_events(vec![timeline_event("ev-1", 600, "Order entered")]);
    let config = SyncConfig {
        significance_floor: 900,
        auto_safe_threshold: 300,
        ..SyncConfig::default()
    };

    let report = h.engine(reader, config).run().await.unwrap();

    assert!(report.fatal_error.is_some());
    assert_eq!(report.synced() + report.skipped() + report.errored(), 0);
    assert_eq!(h.writer.entry_count(), 0);
    // The fatal report is still persisted for the dashboard.
    assert_eq!(h.reports.saved().len(), 1);
}

// ---------------------------------------------------------------------------
// Single flight
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_run_fails_with_sync_in_progress() {
    let h = Harness::new();
    let reader = MockCaseReader::new()
        .with_events(vec![timeline_event("ev-1", 600, "Order entered")])
        .with_fetch_delay(Duration::from_millis(200));
    let engine = Arc::new(h.engine(reader, SyncConfig::default()));

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = engine.run().await;
    assert!(matches!(second, Err(CaselightError::SyncInProgress)));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.timeline_events.synced, 1);

    // Lock released: a later pass goes through and its window starts after
    // the first one finished.
    let third = engine.run().await.unwrap();
    assert!(third.started_at >= first.finished_at);
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn synced_entries_offered_to_sinks() {
    let h = Harness::new();
    let sink = Arc::new(RecordingSink::new());
    let reader = MockCaseReader::new()
        .with_events(vec![timeline_event("ev-1", 600, "Order entered")])
        .with_resources(vec![resource("res-1", 100, None)]); // skipped

    let engine = h
        .engine(reader, SyncConfig::default())
        .with_sink(Arc::new(NoopSink) as Arc<dyn PublishSink>)
        .with_sink(sink.clone() as Arc<dyn PublishSink>);
    engine.run().await.unwrap();

    // Only the synced entry reaches the sink; the skipped one never does.
    assert_eq!(sink.published(), vec!["ev-1".to_string()]);
}

#[tokio::test]
async fn sink_failure_does_not_affect_outcome() {
    let h = Harness::new();
    let sink = Arc::new(RecordingSink::failing());
    let reader =
        MockCaseReader::new().with_events(vec![timeline_event("ev-1", 600, "Order entered")]);

    let engine = h
        .engine(reader, SyncConfig::default())
        .with_sink(sink as Arc<dyn PublishSink>);
    let report = engine.run().await.unwrap();

    assert_eq!(report.timeline_events.synced, 1);
    assert_eq!(report.errored(), 0);
}

// ---------------------------------------------------------------------------
// Report persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_pass_persists_a_report() {
    let h = Harness::new();
    let config = SyncConfig::default();

    for i in 0..3 {
        let reader = MockCaseReader::new().with_events(vec![timeline_event(
            &format!("ev-{i}"),
            600,
            "Order entered",
        )]);
        h.engine(reader, config.clone()).run().await.unwrap();
    }

    let saved = h.reports.saved();
    assert_eq!(saved.len(), 3);
    assert!(saved.windows(2).all(|w| w[0].run_id != w[1].run_id));
}
