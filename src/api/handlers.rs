//! API Handlers
//!
//! HTTP request handlers for each badge server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::badge::{render_badge, SVG_CONTENT_TYPE};
use crate::cache::{CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::github::GithubClient;
use crate::models::{HealthResponse, StatsResponse};
use crate::wordcount::{CountSettings, WordCounter};

/// Application state shared across all handlers.
///
/// One cache per process, built at startup and handed to every component
/// that memoizes through it.
#[derive(Clone)]
pub struct AppState {
    /// Store behind every memoized call
    pub cache: SharedCache<Value>,
    /// Memoized repository word counter
    pub counter: Arc<WordCounter>,
}

impl AppState {
    /// Creates a new AppState from an already wired counter.
    pub fn new(cache: SharedCache<Value>, counter: WordCounter) -> Self {
        Self {
            cache,
            counter: Arc::new(counter),
        }
    }

    /// Builds the cache, GitHub client and word counter from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheStore::new(config.cache_max_entries, config.cache_default_ttl())
            .into_shared();

        let github = GithubClient::new(
            config.gh_api_url.clone(),
            config.gh_token.clone(),
            config.request_timeout(),
            cache.clone(),
        )?;

        let counter = WordCounter::new(Arc::new(github), CountSettings::from(config), cache.clone())?;

        Ok(Self::new(cache, counter))
    }
}

/// Handler for GET /:user/:repo.svg
///
/// Renders the progress badge for `user/repo`.
pub async fn badge_handler(
    State(state): State<AppState>,
    Path((user, file)): Path<(String, String)>,
) -> Result<Response> {
    let repo = file
        .strip_suffix(".svg")
        .filter(|repo| !repo.is_empty())
        .ok_or_else(|| AppError::NotFound(format!("/{user}/{file}")))?;

    let count = state.counter.word_count(&user, repo).await?;
    debug!(%user, repo, words = count.words, goal = count.goal, "rendering badge");

    Ok((
        [(header::CONTENT_TYPE, SVG_CONTENT_TYPE)],
        render_badge(&count),
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::new(&cache.stats(), cache.max_entries()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_state() -> AppState {
        let cache = CacheStore::new(100, None).into_shared();
        let github = GithubClient::new(
            "http://127.0.0.1:1",
            "token",
            Duration::from_millis(200),
            cache.clone(),
        )
        .unwrap();
        let counter =
            WordCounter::new(Arc::new(github), CountSettings::default(), cache.clone()).unwrap();
        AppState::new(cache, counter)
    }

    #[tokio::test]
    async fn test_badge_requires_svg_suffix() {
        let result = badge_handler(
            State(test_state()),
            Path(("octocat".to_string(), "novel.png".to_string())),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = badge_handler(
            State(test_state()),
            Path(("octocat".to_string(), ".svg".to_string())),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_badge_served_from_warm_cache() {
        let state = test_state();
        state.cache.write().await.set(
            "octocat/novel::wordcount",
            serde_json::json!({"words": 1000, "goal": 50000}),
            None,
        );

        let response = badge_handler(
            State(state),
            Path(("octocat".to_string(), "novel.svg".to_string())),
        )
        .await
        .unwrap();

        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            SVG_CONTENT_TYPE
        );
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        state.cache.write().await.get("missing");

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 1);
        assert_eq!(response.max_entries, 100);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
