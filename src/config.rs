//! Configuration Module
//!
//! Command-line flags with environment variable fallbacks.

use std::time::Duration;

use clap::Parser;

/// Server configuration parameters.
///
/// Every flag can also be supplied through the environment variable named
/// next to it.
#[derive(Parser, Debug, Clone)]
#[command(name = "wordbadge")]
#[command(version, about = "Serve word-count progress badges for GitHub repositories")]
pub struct Config {
    /// GitHub API token
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub gh_token: String,

    /// GitHub API base URL
    #[arg(long, env = "GH_API_URL", default_value = "https://api.github.com")]
    pub gh_api_url: String,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, short, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Enable debug logging
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Maximum number of cached entries
    #[arg(long, env = "CACHE_MAX_ENTRIES", default_value_t = 1000)]
    pub cache_max_entries: usize,

    /// Fallback TTL in seconds for cache entries (0 disables)
    #[arg(long, env = "CACHE_DEFAULT_TTL", default_value_t = 600)]
    pub cache_default_ttl: u64,

    /// Branch whose tree is counted
    #[arg(long, env = "WORDBADGE_BRANCH", default_value = "master")]
    pub branch: String,

    /// Top-level directory holding the counted files
    #[arg(long, env = "WORDBADGE_CHAPTER_DIR", default_value = "ch")]
    pub chapter_dir: String,

    /// File name suffix of counted files
    #[arg(long, env = "WORDBADGE_EXTENSION", default_value = ".mkd")]
    pub extension: String,

    /// Word goal shown on the badge
    #[arg(long, env = "WORDBADGE_GOAL", default_value_t = 50_000)]
    pub goal: u64,

    /// Timeout in seconds for each GitHub request
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,
}

impl Config {
    /// Default TTL for the cache store, `None` when disabled.
    pub fn cache_default_ttl(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.cache_default_ttl)).filter(|ttl| !ttl.is_zero())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// `host:port` to listen on; the host may be a name.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "wordbadge=debug,tower_http=debug"
        } else {
            "wordbadge=info,tower_http=info"
        }
    }
}
