//! wordbadge - word-count progress badges for GitHub repositories
//!
//! Every outbound GitHub call and every repository walk is memoized through
//! one in-process TTL cache with FIFO eviction.

pub mod api;
pub mod badge;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod wordcount;

pub use api::AppState;
pub use config::Config;
