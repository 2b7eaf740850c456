pub mod error;
pub mod types;

pub use error::{CasefileError, Result};
pub use types::{HearingDto, ListResponse, ResourceDto, TimelineEventDto};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// Read-only client for the case-management REST API.
pub struct CasefileClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CasefileClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Fetch timeline events at or above `min_significance`, newest first.
    pub async fn timeline_events(
        &self,
        min_significance: u32,
        limit: u32,
    ) -> Result<Vec<TimelineEventDto>> {
        let url = format!(
            "{}/api/v1/timeline-events?min_significance={}&limit={}",
            self.base_url, min_significance, limit
        );
        tracing::info!(min_significance, limit, "Fetching timeline events");
        self.get_list(&url).await
    }

    /// Fetch hearings scheduled within `[start, end]`.
    pub async fn upcoming_hearings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HearingDto>> {
        let url = format!(
            "{}/api/v1/hearings?from={}&to={}",
            self.base_url,
            start.to_rfc3339(),
            end.to_rfc3339()
        );
        tracing::info!(from = %start, to = %end, "Fetching upcoming hearings");
        self.get_list(&url).await
    }

    /// Fetch support resources.
    pub async fn resources(&self, limit: u32) -> Result<Vec<ResourceDto>> {
        let url = format!("{}/api/v1/resources?limit={}", self.base_url, limit);
        tracing::info!(limit, "Fetching resources");
        self.get_list(&url).await
    }

    async fn get_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CasefileError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: ListResponse<T> = resp.json().await?;
        Ok(list.items)
    }
}
