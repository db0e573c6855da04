//! Cache-First Accessor
//!
//! "Return the cached value, or compute it, store it and return it."

use std::future::Future;

use tracing::{debug, trace};

use crate::cache::ExpiringStore;

/// Returns the fresh value cached under `key`, or runs `fetcher` and caches
/// what it produces.
///
/// On a hit `fetcher` is never called. On a miss its result is awaited and,
/// if `Ok`, stored for `ttl_ms` (the store's default TTL when `None`) before
/// being returned. An `Err` is handed back untouched and nothing is written,
/// so the next call for `key` runs the fetcher again.
///
/// No lock is held while `fetcher` runs. Concurrent misses for the same key
/// each run their own fetcher and the last write wins.
pub async fn cached_fetch<V, E, F, Fut>(
    store: &ExpiringStore<V>,
    key: &str,
    fetcher: F,
    ttl_ms: Option<i64>,
) -> Result<V, E>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(cached) = store.get(key) {
        trace!(key, "cache hit");
        return Ok(cached);
    }

    debug!(key, "cache miss, fetching");
    let fresh = match fetcher().await {
        Ok(value) => value,
        Err(err) => {
            debug!(key, "fetch failed, nothing cached");
            return Err(err);
        }
    };

    let ttl_ms = ttl_ms.unwrap_or_else(|| store.default_ttl_ms());
    store.set(key, fresh.clone(), ttl_ms);
    Ok(fresh)
}

impl<V: Clone> ExpiringStore<V> {
    /// [`cached_fetch`] with the store's default TTL.
    pub async fn cached_fetch<E, F, Fut>(&self, key: &str, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        cached_fetch(self, key, fetcher, None).await
    }

    /// [`cached_fetch`] with an explicit TTL in milliseconds.
    pub async fn cached_fetch_with_ttl<E, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl_ms: i64,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        cached_fetch(self, key, fetcher, Some(ttl_ms)).await
    }
}
