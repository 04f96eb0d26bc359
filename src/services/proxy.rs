//! Cache-in-front-of-upstream with retry and stale-on-error fallback.

use super::cache::{CacheEntry, TtlCache};
use super::freshness::evaluate_freshness;
use super::retry::{with_retry, FetchControl, RetryPolicy};
use crate::error::{AppError, Result};
use crate::types::FreshnessVerdict;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Data served by a [`CachedResource`], with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub data: T,
    /// Served from the cache rather than a fetch made for this request.
    pub cached: bool,
    /// Served from an expired entry because the refresh failed.
    pub stale: bool,
    /// Epoch milliseconds of the upstream fetch that produced `data`.
    pub fetched_at: i64,
}

impl<T> Cached<T> {
    fn hit(entry: CacheEntry<T>) -> Self {
        Self {
            data: entry.data,
            cached: true,
            stale: false,
            fetched_at: entry.fetched_at,
        }
    }

    fn stale(entry: CacheEntry<T>) -> Self {
        Self {
            data: entry.data,
            cached: true,
            stale: true,
            fetched_at: entry.fetched_at,
        }
    }

    fn fetched(data: T, fetched_at: i64) -> Self {
        Self {
            data,
            cached: false,
            stale: false,
            fetched_at,
        }
    }

    /// Freshness verdict against `threshold`, evaluated now.
    pub fn freshness(&self, threshold: Duration) -> FreshnessVerdict {
        evaluate_freshness(self.fetched_at, threshold.as_millis() as i64)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            data: f(self.data),
            cached: self.cached,
            stale: self.stale,
            fetched_at: self.fetched_at,
        }
    }
}

/// One upstream resource type with its own cache, TTL and retry policy.
pub struct CachedResource<T> {
    name: &'static str,
    cache: TtlCache<T>,
    retry: RetryPolicy,
}

impl<T: Clone> CachedResource<T> {
    pub fn new(name: &'static str, ttl: Duration, max_entries: usize, retry: RetryPolicy) -> Self {
        Self {
            name,
            cache: TtlCache::new(ttl, max_entries),
            retry,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub fn cache(&self) -> &TtlCache<T> {
        &self.cache
    }

    /// Serve `key` from cache when live, otherwise fetch with retry.
    ///
    /// When the fetch fails and any entry exists for `key`, that entry is
    /// returned flagged stale instead of the error. Cancellation is always
    /// returned as an error.
    pub async fn get<F, Fut>(
        &self,
        key: &str,
        control: &FetchControl,
        fetch: F,
    ) -> Result<Cached<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let now = chrono::Utc::now().timestamp_millis();
        if let Some(entry) = self.cache.get_live(key, now) {
            debug!("{} cache hit: {}", self.name, key);
            return Ok(Cached::hit(entry));
        }

        match with_retry(self.name, &self.retry, control, fetch).await {
            Ok(data) => {
                let fetched_at = chrono::Utc::now().timestamp_millis();
                self.cache.insert(key, data.clone(), fetched_at);
                Ok(Cached::fetched(data, fetched_at))
            }
            Err(AppError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => match self.cache.get_any(key) {
                Some(entry) => {
                    warn!(
                        "{} refresh failed for {}, serving stale data from {}: {}",
                        self.name, key, entry.fetched_at, e
                    );
                    Ok(Cached::stale(entry))
                }
                None => Err(e),
            },
        }
    }

    /// Drop one key.
    pub fn evict(&self, key: &str) {
        self.cache.evict(key);
    }

    /// Drop every key.
    pub fn clear(&self) {
        self.cache.clear();
    }
}
