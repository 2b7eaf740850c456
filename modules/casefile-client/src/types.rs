use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A timeline event as returned by `/api/v1/timeline-events`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineEventDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub significance: u32,
    #[serde(rename = "occursAt")]
    pub occurs_at: DateTime<Utc>,
    #[serde(rename = "eventType")]
    pub event_type: Option<String>,
}

/// A court hearing as returned by `/api/v1/hearings`.
#[derive(Debug, Clone, Deserialize)]
pub struct HearingDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub significance: u32,
    #[serde(rename = "startsAt")]
    pub starts_at: DateTime<Utc>,
    #[serde(rename = "endsAt")]
    pub ends_at: Option<DateTime<Utc>>,
    pub courtroom: Option<String>,
}

/// A support resource as returned by `/api/v1/resources`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub significance: u32,
    #[serde(rename = "contactInfo")]
    pub contact_info: Option<String>,
    pub link: Option<String>,
    /// Pre-vetting flag set by case staff. Absent when never reviewed.
    #[serde(rename = "publicSafe")]
    pub public_safe: Option<bool>,
}

/// Envelope for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_timeline_event() {
        let json = r#"{
            "id": "ev-42",
            "title": "Motion to compel filed",
            "body": "Filed by defense counsel.",
            "significance": 640,
            "occursAt": "2025-11-03T15:00:00Z",
            "eventType": "filing"
        }"#;
        let dto: TimelineEventDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.id, "ev-42");
        assert_eq!(dto.significance, 640);
        assert_eq!(dto.event_type.as_deref(), Some("filing"));
    }

    #[test]
    fn deserialize_resource_without_vetting_flag() {
        let json = r#"{
            "id": "res-7",
            "title": "Victim advocate hotline",
            "significance": 500,
            "contactInfo": null,
            "link": "https://example.org/hotline"
        }"#;
        let dto: ResourceDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.public_safe, None);
        assert!(dto.body.is_empty());
    }
}
