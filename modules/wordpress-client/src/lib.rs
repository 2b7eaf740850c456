pub mod error;
pub mod types;

pub use error::{Result, WordPressError};
pub use types::{CategoryDto, NewCategory, NewPost, PostResponse, PostUpdate};

/// WordPress REST API client authenticated with an application password.
pub struct WordPressClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    app_password: String,
}

impl WordPressClient {
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        app_password: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: user.into(),
            app_password: app_password.into(),
        }
    }

    /// Create a post. Returns the id assigned by WordPress.
    pub async fn create_post(&self, post: &NewPost) -> Result<u64> {
        let url = format!("{}/wp-json/wp/v2/posts", self.base_url);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.app_password))
            .json(post)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WordPressError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: PostResponse = resp.json().await?;
        tracing::info!(post_id = created.id, status = created.status.as_str(), "Post created");
        Ok(created.id)
    }

    /// Update a post's content fields. The payload carries no `status`, so
    /// the post's publish/pending state is left as the editors set it.
    pub async fn update_post(&self, post_id: u64, update: &PostUpdate) -> Result<()> {
        let url = format!("{}/wp-json/wp/v2/posts/{}", self.base_url, post_id);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.app_password))
            .json(update)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WordPressError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::info!(post_id, "Post updated");
        Ok(())
    }

    /// Replace a post's category assignment.
    pub async fn set_categories(&self, post_id: u64, category_ids: &[u64]) -> Result<()> {
        let url = format!("{}/wp-json/wp/v2/posts/{}", self.base_url, post_id);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.app_password))
            .json(&serde_json::json!({ "categories": category_ids }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WordPressError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }

    /// Look up a category by slug, creating it if missing. Returns its id.
    pub async fn ensure_category(&self, slug: &str, name: &str) -> Result<u64> {
        let url = format!("{}/wp-json/wp/v2/categories?slug={}", self.base_url, slug);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.user, Some(&self.app_password))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WordPressError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let existing: Vec<CategoryDto> = resp.json().await?;
        if let Some(category) = existing.into_iter().next() {
            return Ok(category.id);
        }

        let create_url = format!("{}/wp-json/wp/v2/categories", self.base_url);
        let resp = self
            .client
            .post(&create_url)
            .basic_auth(&self.user, Some(&self.app_password))
            .json(&NewCategory {
                name: name.to_string(),
                slug: slug.to_string(),
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WordPressError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: CategoryDto = resp.json().await?;
        tracing::info!(slug, category_id = created.id, "Category created");
        Ok(created.id)
    }

    /// Count posts in a given status via the `X-WP-Total` header.
    pub async fn count_posts_by_status(&self, status: &str) -> Result<u64> {
        let url = format!(
            "{}/wp-json/wp/v2/posts?status={}&per_page=1",
            self.base_url, status
        );
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.user, Some(&self.app_password))
            .send()
            .await?;

        let http_status = resp.status();
        if !http_status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WordPressError::Api {
                status: http_status.as_u16(),
                message: body,
            });
        }

        let total = resp
            .headers()
            .get("X-WP-Total")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(total)
    }
}
