//! HTTP client for the external song info service.
//!
//! The service answers `GET {base_url}/info?group=..&song=..` with a JSON
//! body `{release_date, text, link}`.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::models::EnrichmentResult;
use crate::error::{CatalogError, CatalogResult};

#[async_trait]
pub trait EnrichmentApi: Send + Sync {
    /// Fetch metadata for a song that is not stored yet.
    async fn fetch(&self, group: &str, song: &str) -> CatalogResult<EnrichmentResult>;
}

#[derive(Clone)]
pub struct HttpEnrichmentClient {
    client: Client,
    base_url: Option<String>,
}

impl HttpEnrichmentClient {
    /// An empty or absent `base_url` builds a client whose every fetch fails.
    pub fn new(base_url: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn info_url(base_url: &str, group: &str, song: &str) -> String {
        format!(
            "{}/info?group={}&song={}",
            base_url,
            urlencoding::encode(group),
            urlencoding::encode(song)
        )
    }
}

#[async_trait]
impl EnrichmentApi for HttpEnrichmentClient {
    async fn fetch(&self, group: &str, song: &str) -> CatalogResult<EnrichmentResult> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            CatalogError::UpstreamUnavailable("external API url not configured".to_string())
        })?;
        let url = Self::info_url(base_url, group, song);
        debug!("Fetching song info from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::UpstreamUnavailable(format!("request to external API timed out: {}", e))
            } else {
                CatalogError::UpstreamUnavailable(format!("failed to reach external API: {}", e))
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CatalogError::UpstreamUnavailable(format!(
                "external API returned status {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            CatalogError::UpstreamUnavailable(format!("failed to read external API response: {}", e))
        })?;
        serde_json::from_slice(&body).map_err(|e| {
            CatalogError::UpstreamMalformed(format!("invalid external API response: {}", e))
        })
    }
}
