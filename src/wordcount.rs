//! Word Counting
//!
//! Walks a repository tree on GitHub and totals the words in the selected
//! files. The whole walk is memoized for ten minutes; each request inside it
//! goes through the GitHub client's own cache.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::cache::{Memoized, SharedCache};
use crate::error::{AppError, Result};
use crate::github::GithubClient;

/// Key template for memoized word counts
pub const WORD_COUNT_CACHE_KEY: &str = "{0}/{1}::wordcount";

/// How long a computed word count stays cached
pub const WORD_COUNT_CACHE_TTL: Duration = Duration::from_secs(600);

// == Count Words ==
/// Counts words in `text`.
///
/// Tokens are maximal runs of word characters (alphanumerics and `_`) and
/// apostrophes; everything else separates them.
pub fn count_words(text: &str) -> usize {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '\''))
        .filter(|token| !token.is_empty())
        .count()
}

// == Word Count ==
/// Result of counting a repository: words written and the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub words: u64,
    pub goal: u64,
}

impl WordCount {
    /// Fraction of the goal reached, capped at 1.0. A zero goal reads as 0.
    pub fn progress(&self) -> f64 {
        if self.goal == 0 {
            0.0
        } else {
            (self.words as f64 / self.goal as f64).min(1.0)
        }
    }
}

/// Which files count and what they count towards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountSettings {
    /// Branch whose tree is walked
    pub branch: String,
    /// Top-level directory holding the counted files
    pub chapter_dir: String,
    /// File name suffix of counted files
    pub extension: String,
    /// Word goal
    pub goal: u64,
}

impl Default for CountSettings {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            chapter_dir: "ch".to_string(),
            extension: ".mkd".to_string(),
            goal: 50_000,
        }
    }
}

impl From<&crate::config::Config> for CountSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            branch: config.branch.clone(),
            chapter_dir: config.chapter_dir.clone(),
            extension: config.extension.clone(),
            goal: config.goal,
        }
    }
}

// == GitHub payloads ==
#[derive(Debug, Deserialize)]
struct Tree {
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Blob {
    content: String,
    encoding: String,
}

fn parse<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AppError::Decode(format!("{what}: {e}")))
}

// == Word Counter ==
/// Computes [`WordCount`]s for `user/repo` pairs.
#[derive(Debug)]
pub struct WordCounter {
    github: Arc<GithubClient>,
    settings: CountSettings,
    memo: Memoized,
}

impl WordCounter {
    pub fn new(
        github: Arc<GithubClient>,
        settings: CountSettings,
        cache: SharedCache<Value>,
    ) -> Result<Self> {
        Ok(Self {
            github,
            settings,
            memo: Memoized::new(cache, WORD_COUNT_CACHE_KEY, Some(WORD_COUNT_CACHE_TTL))?,
        })
    }

    // == Word Count ==
    /// Returns the word count for `user/repo`, cached for ten minutes.
    pub async fn word_count(&self, user: &str, repo: &str) -> Result<WordCount> {
        self.memo
            .call(&[&user, &repo], || self.count(user, repo))
            .await
    }

    #[instrument(skip(self))]
    async fn count(&self, user: &str, repo: &str) -> Result<WordCount> {
        let root: Tree = parse(
            self.github
                .get_json(&format!(
                    "/repos/{user}/{repo}/git/trees/{}",
                    self.settings.branch
                ))
                .await?,
            "repository tree",
        )?;

        let chapters_url = root
            .tree
            .into_iter()
            .find(|entry| entry.path == self.settings.chapter_dir)
            .and_then(|entry| entry.url)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "directory '{}' in {user}/{repo}",
                    self.settings.chapter_dir
                ))
            })?;

        let chapters: Tree = parse(self.github.get_json(&chapters_url).await?, "chapter tree")?;

        let mut words: u64 = 0;
        let mut files = 0usize;
        for entry in chapters.tree {
            if !entry.path.ends_with(&self.settings.extension) {
                continue;
            }
            let Some(url) = entry.url else {
                continue;
            };

            let blob: Blob = parse(self.github.get_json(&url).await?, "blob")?;
            let text = decode_blob(&blob, &entry.path)?;
            let count = count_words(&text) as u64;
            debug!(path = %entry.path, words = count, "counted file");

            words += count;
            files += 1;
        }

        info!(files, words, "word count computed");
        Ok(WordCount {
            words,
            goal: self.settings.goal,
        })
    }
}

/// Decodes a GitHub blob's base64 body into text.
fn decode_blob(blob: &Blob, path: &str) -> Result<String> {
    if blob.encoding != "base64" {
        return Err(AppError::Decode(format!(
            "{path}: unsupported blob encoding '{}'",
            blob.encoding
        )));
    }

    // GitHub wraps the base64 body at 60 columns
    let compact: String = blob.content.split_whitespace().collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| AppError::Decode(format!("{path}: {e}")))?;

    String::from_utf8(bytes).map_err(|e| AppError::Decode(format!("{path}: {e}")))
}
