//! Document fetching over HTTP

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{OverridesError, Result};
use crate::types::ScrapeConfig;

/// Source of remote documents
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at an absolute URL as text
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// `reqwest` backed fetcher. One attempt per call, no caching.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to create configured HTTP client: {}. Using default.", e);
                Client::new()
            });

        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::info!(url = %url, "Fetching");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OverridesError::fetch(
                format!("Request failed with status {}", status),
                Some(status.as_u16()),
                Some(url.to_string()),
            ));
        }

        let text = response.text().await?;
        tracing::debug!(url = %url, bytes = text.len(), "Fetched");
        Ok(text)
    }
}
