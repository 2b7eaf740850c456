use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use caselight_common::TargetEntry;

/// Optional secondary publication target. Sinks are registered at startup
/// and offered every successfully written entry; a sink failure never
/// affects the record's sync outcome.
#[async_trait]
pub trait PublishSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(&self, entry: &TargetEntry) -> Result<()>;
}

/// Pushes dated entries (hearings, timeline events) to a calendar webhook.
/// Undated entries are ignored.
pub struct CalendarFeedSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl CalendarFeedSink {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl PublishSink for CalendarFeedSink {
    fn name(&self) -> &'static str {
        "calendar"
    }

    async fn publish(&self, entry: &TargetEntry) -> Result<()> {
        let Some(occurs_at) = entry.occurs_at else {
            return Ok(());
        };

        let payload = serde_json::json!({
            "title": entry.display_title,
            "starts_at": occurs_at.to_rfc3339(),
            "category": entry.category.slug(),
            "source_id": entry.source_id,
        });

        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("calendar webhook returned {}", resp.status());
        }

        info!(title = entry.display_title.as_str(), "Pushed entry to calendar feed");
        Ok(())
    }
}

/// Sink that does nothing. Used in tests and as a placeholder.
pub struct NoopSink;

#[async_trait]
impl PublishSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn publish(&self, _entry: &TargetEntry) -> Result<()> {
        Ok(())
    }
}
