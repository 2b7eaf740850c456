use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caselight_common::RecordKind;

/// Outcome of syncing a single record. Every fetched record yields exactly
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Synced,
    Skipped,
    Errored,
}

/// Per-kind counters for one sync pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindReport {
    pub synced: u32,
    pub skipped: u32,
    pub errored: u32,
    /// Set when the kind's batch fetch itself failed; the kind's counters
    /// stay at zero because no record was observed.
    pub fetch_error: Option<String>,
}

impl KindReport {
    pub fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Synced => self.synced += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Errored => self.errored += 1,
        }
    }
}

/// Report for one full sync pass. Produced fresh each pass; prior reports
/// are kept for the dashboard only and never consulted for sync logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub timeline_events: KindReport,
    pub court_hearings: KindReport,
    pub resources: KindReport,
    pub fatal_error: Option<String>,
}

impl RunReport {
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            timeline_events: KindReport::default(),
            court_hearings: KindReport::default(),
            resources: KindReport::default(),
            fatal_error: None,
        }
    }

    pub fn kind_mut(&mut self, kind: RecordKind) -> &mut KindReport {
        match kind {
            RecordKind::TimelineEvent => &mut self.timeline_events,
            RecordKind::CourtHearing => &mut self.court_hearings,
            RecordKind::Resource => &mut self.resources,
        }
    }

    pub fn kind(&self, kind: RecordKind) -> &KindReport {
        match kind {
            RecordKind::TimelineEvent => &self.timeline_events,
            RecordKind::CourtHearing => &self.court_hearings,
            RecordKind::Resource => &self.resources,
        }
    }

    pub fn synced(&self) -> u32 {
        self.timeline_events.synced + self.court_hearings.synced + self.resources.synced
    }

    pub fn skipped(&self) -> u32 {
        self.timeline_events.skipped + self.court_hearings.skipped + self.resources.skipped
    }

    pub fn errored(&self) -> u32 {
        self.timeline_events.errored + self.court_hearings.errored + self.resources.errored
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Sync Pass Complete ===")?;
        writeln!(f, "Run:      {}", self.run_id)?;
        writeln!(f, "Synced:   {}", self.synced())?;
        writeln!(f, "Skipped:  {}", self.skipped())?;
        writeln!(f, "Errored:  {}", self.errored())?;
        writeln!(f, "\nBy kind:")?;
        for kind in RecordKind::ALL {
            let k = self.kind(kind);
            write!(
                f,
                "  {:<16} synced {:<4} skipped {:<4} errored {}",
                kind.to_string(),
                k.synced,
                k.skipped,
                k.errored
            )?;
            match &k.fetch_error {
                Some(e) => writeln!(f, "  (fetch failed: {e})")?,
                None => writeln!(f)?,
            }
        }
        if let Some(e) = &self.fatal_error {
            writeln!(f, "\nFatal: {e}")?;
        }
        Ok(())
    }
}
