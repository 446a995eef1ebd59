//! GitHub API Client
//!
//! Authenticated JSON GETs against the GitHub REST API, memoized per URL.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::cache::{Memoized, SharedCache};
use crate::error::{AppError, Result};

/// Key template for memoized API responses
pub const API_CACHE_KEY: &str = "GET {0}";

/// How long a single API response stays cached
pub const API_CACHE_TTL: Duration = Duration::from_secs(30);

// == GitHub Client ==
/// Thin GitHub REST client whose responses go through the shared cache.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    memo: Memoized,
}

impl GithubClient {
    /// Creates a client for `base_url` (e.g. `https://api.github.com`).
    ///
    /// # Arguments
    /// * `base_url` - Prefix for relative request paths
    /// * `token` - Sent as `Authorization: Token <token>`
    /// * `timeout` - Per-request timeout
    /// * `cache` - Store shared with the other memoized calls
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
        cache: SharedCache<Value>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wordbadge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            memo: Memoized::new(cache, API_CACHE_KEY, Some(API_CACHE_TTL))?,
        })
    }

    // == Resolve URL ==
    /// Absolute `http(s)://` URLs pass through; anything else is joined onto
    /// the base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    // == Get JSON ==
    /// Fetches `url` as JSON, answering from cache for 30 seconds.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let url = self.resolve_url(url);
        self.memo.call(&[&url], || self.fetch(&url)).await
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Value> {
        info!("GitHub request");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "GitHub request rejected");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url)
            .field("memo", &self.memo)
            .finish_non_exhaustive()
    }
}
