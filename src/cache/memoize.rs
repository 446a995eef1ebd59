//! Memoization Module
//!
//! Wraps fallible async computations so repeat calls with the same rendered
//! key are answered from a [`SharedCache`].

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{KeyArg, KeyTemplate, SharedCache};
use crate::error::CacheError;

// == Memoized ==
/// A call-through wrapper bound to a cache, a key template and a TTL.
///
/// Successful results are stored as JSON values under the rendered key.
/// Errors from the wrapped computation are returned untouched and never
/// cached, so the next call with the same arguments recomputes.
///
/// Several wrappers may share one cache, and a computation wrapped by one
/// may itself call through another.
#[derive(Clone)]
pub struct Memoized {
    cache: SharedCache<Value>,
    template: KeyTemplate,
    ttl: Option<Duration>,
}

impl Memoized {
    /// # Arguments
    /// * `cache` - Backing store, usually shared with other wrappers
    /// * `template` - Key template, e.g. `"{0}/{1}::wordcount"`
    /// * `ttl` - Per-entry TTL; `None` defers to the store's default
    pub fn new(
        cache: SharedCache<Value>,
        template: &str,
        ttl: Option<Duration>,
    ) -> Result<Self, CacheError> {
        Ok(Self {
            cache,
            template: KeyTemplate::parse(template)?,
            ttl,
        })
    }

    // == Call ==
    /// Returns the cached result for `args`, or runs `compute` and caches
    /// its `Ok` output.
    ///
    /// The key is rendered before the returned future is created, so `args`
    /// need not outlive this call. The cache lock is released while
    /// `compute` runs.
    pub fn call<'a, T, E, F, Fut>(
        &'a self,
        args: &[KeyArg<'_>],
        compute: F,
    ) -> impl Future<Output = Result<T, E>> + 'a
    where
        T: Serialize + DeserializeOwned + 'a,
        E: From<CacheError> + 'a,
        F: FnOnce() -> Fut + 'a,
        Fut: Future<Output = Result<T, E>> + 'a,
    {
        let key = self.template.render(args);

        async move {
            let key = key?;

            let cached = self.cache.write().await.get(&key);
            if let Some(value) = cached {
                match serde_json::from_value::<T>(value) {
                    Ok(hit) => {
                        debug!(key = %key, "memo hit");
                        return Ok(hit);
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "cached value has wrong shape, recomputing");
                        self.cache.write().await.reject_hit();
                    }
                }
            }

            debug!(key = %key, "memo miss");
            let result = compute().await?;

            match serde_json::to_value(&result) {
                Ok(value) => self.cache.write().await.set(key, value, self.ttl),
                Err(e) => warn!(key = %key, error = %e, "result not cacheable"),
            }

            Ok(result)
        }
    }
}

impl std::fmt::Debug for Memoized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoized")
            .field("template", &self.template.as_str())
            .field("ttl", &self.ttl)
            .finish()
    }
}
