use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use caselight_common::{
    ApprovalState, CaseRecord, CaselightError, Category, RecordKind, SyncConfig, TargetEntry,
};

use crate::report::{Outcome, RunReport};
use crate::sinks::PublishSink;
use crate::traits::{CaseReader, ContentWriter, DisclosureFilter, IdentityMap, ReportStore};

/// One sync pass per record kind, sequentially: fetch, filter, transform,
/// upsert, classify. Holds a run lock so at most one pass is in flight.
pub struct SyncEngine {
    reader: Arc<dyn CaseReader>,
    writer: Arc<dyn ContentWriter>,
    identity: Arc<dyn IdentityMap>,
    reports: Arc<dyn ReportStore>,
    filter: Arc<dyn DisclosureFilter>,
    sinks: Vec<Arc<dyn PublishSink>>,
    config: SyncConfig,
    run_lock: tokio::sync::Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        reader: Arc<dyn CaseReader>,
        writer: Arc<dyn ContentWriter>,
        identity: Arc<dyn IdentityMap>,
        reports: Arc<dyn ReportStore>,
        filter: Arc<dyn DisclosureFilter>,
        config: SyncConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            identity,
            reports,
            filter,
            sinks: Vec::new(),
            config,
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Register a secondary publication sink.
    pub fn with_sink(mut self, sink: Arc<dyn PublishSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run a full sync pass. Fails fast with `SyncInProgress` if another
    /// pass holds the run lock.
    pub async fn run(&self) -> Result<RunReport, CaselightError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| CaselightError::SyncInProgress)?;

        let mut report = RunReport::begin();

        // Config problems abort before any record is touched.
        if let Err(e) = self.config.validate() {
            report.fatal_error = Some(e.to_string());
            report.finished_at = Utc::now();
            self.persist(&report).await;
            return Ok(report);
        }

        for kind in RecordKind::ALL {
            match self.fetch_batch(kind).await {
                Ok(records) => {
                    info!(kind = %kind, count = records.len(), "Batch fetched");
                    for record in &records {
                        let outcome = match self.sync_one(record).await {
                            Ok(outcome) => outcome,
                            Err(e) => {
                                warn!(
                                    kind = %kind,
                                    source_id = record.source_id(),
                                    error = %e,
                                    "Record sync failed"
                                );
                                Outcome::Errored
                            }
                        };
                        report.kind_mut(kind).tally(outcome);
                    }
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "Batch fetch failed, skipping kind");
                    report.kind_mut(kind).fetch_error = Some(e.to_string());
                }
            }
        }

        report.finished_at = Utc::now();
        self.persist(&report).await;
        info!("{report}");
        Ok(report)
    }

    async fn fetch_batch(&self, kind: RecordKind) -> Result<Vec<CaseRecord>, CaselightError> {
        let result = match kind {
            RecordKind::TimelineEvent => {
                self.reader
                    .fetch_timeline_events(
                        self.config.significance_floor,
                        self.config.event_batch_limit,
                    )
                    .await
            }
            RecordKind::CourtHearing => {
                let now = Utc::now();
                let end = now + Duration::days(self.config.hearing_window_days);
                self.reader.fetch_upcoming_hearings(now, end).await
            }
            RecordKind::Resource => {
                self.reader
                    .fetch_resources(self.config.resource_batch_limit)
                    .await
            }
        };
        result.map_err(|e| CaselightError::SourceFetch(e.to_string()))
    }

    /// Sync a single record: filter, classify, then create or update.
    /// Unsafe records are skipped without touching the identity map.
    async fn sync_one(&self, record: &CaseRecord) -> Result<Outcome, CaselightError> {
        let meta = record.meta();
        let kind = record.kind();

        let display_title = self
            .filter
            .filter_text(&meta.title)
            .map_err(|e| CaselightError::Filter(e.to_string()))?;
        let display_body = self
            .filter
            .filter_text(&meta.body)
            .map_err(|e| CaselightError::Filter(e.to_string()))?;

        let safe = self
            .filter
            .is_public_safe(&display_body, meta.significance, record.public_safe_hint())
            .map_err(|e| CaselightError::Filter(e.to_string()))?;

        if !safe {
            debug!(kind = %kind, source_id = meta.source_id.as_str(), "Not publication-safe, skipping");
            return Ok(Outcome::Skipped);
        }

        let existing = self
            .identity
            .lookup(kind, &meta.source_id)
            .await
            .map_err(|e| CaselightError::Write(e.to_string()))?;

        // Approval only matters on the create path; updates never carry a
        // state transition (the writer contract ignores it).
        let initial_approval = if self.config.auto_publish {
            ApprovalState::Approved
        } else {
            ApprovalState::Pending
        };

        let mut entry = TargetEntry {
            target_id: existing,
            kind,
            source_id: meta.source_id.clone(),
            display_title,
            display_body,
            approval: initial_approval,
            category: Category::for_record(record),
            occurs_at: record.occurs_at(),
            last_synced_at: Utc::now(),
        };

        match existing {
            None => {
                let target_id = self
                    .writer
                    .create(&entry)
                    .await
                    .map_err(|e| CaselightError::Write(e.to_string()))?;

                // Recorded only after the create is confirmed, never
                // speculatively.
                self.identity
                    .record(kind, &meta.source_id, target_id)
                    .await
                    .map_err(|e| CaselightError::Write(e.to_string()))?;

                entry.target_id = Some(target_id);

                self.writer
                    .set_taxonomy(target_id, entry.category)
                    .await
                    .map_err(|e| CaselightError::Write(e.to_string()))?;

                info!(
                    kind = %kind,
                    source_id = meta.source_id.as_str(),
                    target_id,
                    approval = %entry.approval,
                    "Entry created"
                );
            }
            Some(target_id) => {
                self.writer
                    .update(target_id, &entry)
                    .await
                    .map_err(|e| CaselightError::Write(e.to_string()))?;

                self.writer
                    .set_taxonomy(target_id, entry.category)
                    .await
                    .map_err(|e| CaselightError::Write(e.to_string()))?;

                debug!(
                    kind = %kind,
                    source_id = meta.source_id.as_str(),
                    target_id,
                    "Entry updated"
                );
            }
        }

        self.offer_to_sinks(&entry).await;

        Ok(Outcome::Synced)
    }

    /// Offer a written entry to every registered sink. Failures are logged
    /// and swallowed; sinks are opportunistic.
    async fn offer_to_sinks(&self, entry: &TargetEntry) {
        for sink in &self.sinks {
            if let Err(e) = sink.publish(entry).await {
                warn!(sink = sink.name(), error = %e, "Publish sink failed");
            }
        }
    }

    async fn persist(&self, report: &RunReport) {
        if let Err(e) = self.reports.save(report).await {
            warn!(error = %e, "Failed to persist run report");
        }
    }
}
