use serde::{Deserialize, Serialize};

/// Payload for creating a post. `status` maps the approval gate:
/// pending posts are invisible to the public site until an editor acts.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_gmt: Option<String>,
}

/// Payload for updating a post's content fields. Deliberately has no
/// `status` field; editor decisions are never overwritten by a sync.
#[derive(Debug, Clone, Serialize)]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_gmt: Option<String>,
}

/// Minimal post response, only the fields the sync needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    pub id: u64,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDto {
    pub id: u64,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_update_never_serializes_status() {
        let update = PostUpdate {
            title: "t".to_string(),
            content: "c".to_string(),
            date_gmt: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("status").is_none());
    }

    #[test]
    fn new_post_carries_status_and_omits_empty_date() {
        let post = NewPost {
            title: "t".to_string(),
            content: "c".to_string(),
            status: "pending".to_string(),
            date_gmt: None,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("date_gmt").is_none());
    }
}
