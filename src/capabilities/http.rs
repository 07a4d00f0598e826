// src/capabilities/http.rs
use async_trait::async_trait;
use reqwest::header;
use std::time::Duration;

use super::Renderer;
use crate::utils::error::RenderError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Static page renderer: a plain GET, no JavaScript.
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    /// Creates a reqwest client configured for page fetching.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, link: &str) -> Result<String, RenderError> {
        tracing::debug!(link = %link, "Fetching page");

        let response = self
            .client
            .get(link)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await?; // Propagates reqwest::Error as RenderError::Network

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(link = %link, status = %status, "Page request failed");
            return Err(RenderError::Http {
                link: link.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(RenderError::EmptyPage(link.to_string()));
        }

        tracing::debug!(link = %link, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
