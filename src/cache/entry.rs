//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an absolute expiry.

// == Cache Entry ==
/// A stored value together with the instant it goes stale.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl_ms` after `now_ms`.
    ///
    /// A non-positive TTL yields an entry whose expiry is at or before
    /// `now_ms`, so it is already stale when next read.
    pub fn new(value: V, now_ms: u64, ttl_ms: i64) -> Self {
        Self {
            value,
            expires_at: now_ms.saturating_add_signed(ttl_ms),
        }
    }

    // == Is Fresh ==
    /// An entry is fresh iff its expiry lies strictly after `now_ms`.
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        self.expires_at > now_ms
    }
}
