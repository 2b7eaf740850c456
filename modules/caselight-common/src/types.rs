use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Record kinds ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    TimelineEvent,
    CourtHearing,
    Resource,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::TimelineEvent => write!(f, "timeline_event"),
            RecordKind::CourtHearing => write!(f, "court_hearing"),
            RecordKind::Resource => write!(f, "resource"),
        }
    }
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::TimelineEvent,
        RecordKind::CourtHearing,
        RecordKind::Resource,
    ];

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "timeline_event" => Some(Self::TimelineEvent),
            "court_hearing" => Some(Self::CourtHearing),
            "resource" => Some(Self::Resource),
            _ => None,
        }
    }
}

// --- Record metadata (shared across all record kinds) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Stable identifier from the case-management system. Unique within a kind.
    pub source_id: String,
    pub title: String,
    pub body: String,
    /// Evidentiary weight, 0-1000. Drives category assignment and, for
    /// timeline events, the minimum inclusion threshold.
    pub significance: u32,
}

// --- Record types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEventRecord {
    pub meta: RecordMeta,
    pub occurs_at: DateTime<Utc>,
    /// Event subtype from the case file, e.g. "filing" or "ruling".
    pub event_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtHearingRecord {
    pub meta: RecordMeta,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub courtroom: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub meta: RecordMeta,
    pub contact_info: Option<String>,
    pub link: Option<String>,
    /// Upstream pre-vetting flag. `Some(false)` means the record was
    /// explicitly marked not publishable and must never be mirrored.
    pub public_safe_hint: Option<bool>,
}

// --- Sum type ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CaseRecord {
    TimelineEvent(TimelineEventRecord),
    CourtHearing(CourtHearingRecord),
    Resource(ResourceRecord),
}

impl CaseRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            CaseRecord::TimelineEvent(_) => RecordKind::TimelineEvent,
            CaseRecord::CourtHearing(_) => RecordKind::CourtHearing,
            CaseRecord::Resource(_) => RecordKind::Resource,
        }
    }

    pub fn meta(&self) -> &RecordMeta {
        match self {
            CaseRecord::TimelineEvent(r) => &r.meta,
            CaseRecord::CourtHearing(r) => &r.meta,
            CaseRecord::Resource(r) => &r.meta,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.meta().source_id
    }

    pub fn significance(&self) -> u32 {
        self.meta().significance
    }

    /// The date the record refers to. Resources have none.
    pub fn occurs_at(&self) -> Option<DateTime<Utc>> {
        match self {
            CaseRecord::TimelineEvent(r) => Some(r.occurs_at),
            CaseRecord::CourtHearing(r) => Some(r.starts_at),
            CaseRecord::Resource(_) => None,
        }
    }

    /// The upstream pre-vetting flag. Only resources carry one.
    pub fn public_safe_hint(&self) -> Option<bool> {
        match self {
            CaseRecord::Resource(r) => r.public_safe_hint,
            _ => None,
        }
    }
}

// --- Approval gate ---

/// Human-in-the-loop publication state. The sync engine sets the initial
/// value at creation time and never transitions it afterwards; approved and
/// rejected are operator decisions made in the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalState::Pending => write!(f, "pending"),
            ApprovalState::Approved => write!(f, "approved"),
            ApprovalState::Rejected => write!(f, "rejected"),
        }
    }
}

// --- Taxonomy ---

/// Threshold above which a timeline event files under key evidence.
pub const KEY_EVIDENCE_SIGNIFICANCE: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    KeyEvidence,
    CaseTimeline,
    Hearings,
    Resources,
}

impl Category {
    /// Taxonomy slug used in the content store.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::KeyEvidence => "key-evidence",
            Category::CaseTimeline => "case-timeline",
            Category::Hearings => "hearings",
            Category::Resources => "resources",
        }
    }

    /// Derive the category for a record. Recomputed on every sync pass;
    /// operator edits to taxonomy are overwritten.
    pub fn for_record(record: &CaseRecord) -> Self {
        match record {
            CaseRecord::TimelineEvent(r) => {
                if r.meta.significance >= KEY_EVIDENCE_SIGNIFICANCE {
                    Category::KeyEvidence
                } else {
                    Category::CaseTimeline
                }
            }
            CaseRecord::CourtHearing(_) => Category::Hearings,
            CaseRecord::Resource(_) => Category::Resources,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

// --- Target entry ---

/// The content-store projection of a case record. Content fields are a
/// deterministic function of the source record; `target_id` and `approval`
/// carry operator-owned state and survive re-syncs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Assigned by the content store on first creation.
    pub target_id: Option<u64>,
    pub kind: RecordKind,
    pub source_id: String,
    pub display_title: String,
    pub display_body: String,
    pub approval: ApprovalState,
    pub category: Category,
    pub occurs_at: Option<DateTime<Utc>>,
    pub last_synced_at: DateTime<Utc>,
}

// --- Identity mapping ---

/// Durable correspondence between a source record and its target entry.
/// One row per (kind, source_id); written once after a confirmed create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityMapping {
    pub kind: RecordKind,
    pub source_id: String,
    pub target_id: u64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_meta(significance: u32) -> RecordMeta {
        RecordMeta {
            source_id: "ev-1".to_string(),
            title: "Motion filed".to_string(),
            body: "A motion to compel discovery was filed.".to_string(),
            significance,
        }
    }

    #[test]
    fn high_significance_event_is_key_evidence() {
        let record = CaseRecord::TimelineEvent(TimelineEventRecord {
            meta: test_meta(850),
            occurs_at: Utc::now(),
            event_type: Some("filing".to_string()),
        });
        assert_eq!(Category::for_record(&record), Category::KeyEvidence);
    }

    #[test]
    fn low_significance_event_is_timeline() {
        let record = CaseRecord::TimelineEvent(TimelineEventRecord {
            meta: test_meta(400),
            occurs_at: Utc::now(),
            event_type: None,
        });
        assert_eq!(Category::for_record(&record), Category::CaseTimeline);
    }

    #[test]
    fn hearings_and_resources_have_fixed_categories() {
        let hearing = CaseRecord::CourtHearing(CourtHearingRecord {
            meta: test_meta(999),
            starts_at: Utc::now(),
            ends_at: None,
            courtroom: Some("4B".to_string()),
        });
        let resource = CaseRecord::Resource(ResourceRecord {
            meta: test_meta(999),
            contact_info: None,
            link: None,
            public_safe_hint: None,
        });
        assert_eq!(Category::for_record(&hearing), Category::Hearings);
        assert_eq!(Category::for_record(&resource), Category::Resources);
    }

    #[test]
    fn occurs_at_absent_for_resources() {
        let resource = CaseRecord::Resource(ResourceRecord {
            meta: test_meta(500),
            contact_info: None,
            link: None,
            public_safe_hint: Some(true),
        });
        assert!(resource.occurs_at().is_none());
        assert_eq!(resource.public_safe_hint(), Some(true));
    }

    #[test]
    fn hint_only_carried_by_resources() {
        let event = CaseRecord::TimelineEvent(TimelineEventRecord {
            meta: test_meta(500),
            occurs_at: Utc::now(),
            event_type: None,
        });
        assert_eq!(event.public_safe_hint(), None);
    }

    #[test]
    fn approval_state_serializes_snake_case() {
        let json = serde_json::to_string(&ApprovalState::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert_eq!(ApprovalState::Approved.to_string(), "approved");
    }

    #[test]
    fn category_slugs() {
        assert_eq!(Category::KeyEvidence.slug(), "key-evidence");
        assert_eq!(Category::Hearings.slug(), "hearings");
    }
}
