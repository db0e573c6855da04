//! Cache Store Module
//!
//! Expiring key/value store: HashMap storage, lazy expiry on read and a
//! background sweep for entries nobody reads again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::config::{Config, DEFAULT_SWEEP_INTERVAL_MS};
use crate::tasks::spawn_sweep_task;

pub use crate::config::DEFAULT_TTL_MS;

/// Sweep period used when none is configured
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS);

// == Store State ==
/// Everything guarded by the store's lock.
#[derive(Debug)]
struct StoreState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

#[derive(Debug)]
struct StoreInner<V> {
    state: Mutex<StoreState<V>>,
    /// Handle of the running sweep task, None once disposed
    sweeper: Mutex<Option<JoinHandle<()>>>,
    clock: Arc<dyn Clock>,
    sweep_interval: Duration,
    default_ttl_ms: i64,
}

// == Expiring Store ==
/// Shared in-memory store of values that expire after a per-entry TTL.
///
/// Cloning is cheap and every clone addresses the same entries, so a host
/// builds one store at startup and hands clones to whoever needs it.
///
/// Every operation takes the lock once and finishes without awaiting, so
/// `get`, `set`, `delete`, `clear` and a sweep tick never interleave.
#[derive(Debug)]
pub struct ExpiringStore<V> {
    inner: Arc<StoreInner<V>>,
}

impl<V> Clone for ExpiringStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Non-owning handle held by the sweep task.
#[derive(Debug)]
pub(crate) struct WeakStore<V> {
    inner: Weak<StoreInner<V>>,
}

impl<V> WeakStore<V> {
    pub(crate) fn upgrade(&self) -> Option<ExpiringStore<V>> {
        self.inner.upgrade().map(|inner| ExpiringStore { inner })
    }
}

impl<V: Clone + Send + 'static> ExpiringStore<V> {
    // == Constructor ==
    /// Creates a store on the system clock.
    ///
    /// The sweep starts immediately when called inside a Tokio runtime.
    /// Outside one, no sweep runs and stale entries are only removed on
    /// read or by an explicit [`purge_expired`](Self::purge_expired).
    ///
    /// # Arguments
    /// * `sweep_interval` - Period between background sweeps
    /// * `default_ttl_ms` - TTL applied when callers don't pass one
    pub fn new(sweep_interval: Duration, default_ttl_ms: i64) -> Self {
        Self::with_clock(sweep_interval, default_ttl_ms, Arc::new(SystemClock))
    }

    /// Creates a store that reads time from `clock`.
    pub fn with_clock(sweep_interval: Duration, default_ttl_ms: i64, clock: Arc<dyn Clock>) -> Self {
        // tokio::time::interval panics on a zero period
        let sweep_interval = sweep_interval.max(Duration::from_millis(1));

        let store = Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState {
                    entries: HashMap::new(),
                    stats: CacheStats::new(),
                }),
                sweeper: Mutex::new(None),
                clock,
                sweep_interval,
                default_ttl_ms,
            }),
        };

        if tokio::runtime::Handle::try_current().is_ok() {
            let handle = spawn_sweep_task(store.downgrade(), sweep_interval);
            *store.sweeper() = Some(handle);
        } else {
            warn!("No Tokio runtime available, expiring store will not sweep in the background");
        }

        store
    }

    /// Creates a store from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_millis(config.sweep_interval_ms),
            config.default_ttl_ms,
        )
    }
}

impl<V> ExpiringStore<V> {
    fn state(&self) -> MutexGuard<'_, StoreState<V>> {
        // Critical sections never panic midway, so a poisoned map is still consistent
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweeper(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn downgrade(&self) -> WeakStore<V> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn now_ms(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl_ms` milliseconds from now.
    ///
    /// Overwrites any existing entry. A `ttl_ms` of zero or less is accepted
    /// and produces an entry that is already stale on the next read.
    pub fn set(&self, key: impl Into<String>, value: V, ttl_ms: i64) {
        let entry = CacheEntry::new(value, self.now_ms(), ttl_ms);
        self.state().entries.insert(key.into(), entry);
    }

    /// Stores `value` under `key` with the store's default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.inner.default_ttl_ms);
    }

    // == Delete ==
    /// Removes the entry for `key`, returning whether one was present.
    pub fn delete(&self, key: &str) -> bool {
        self.state().entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        self.state().entries.clear();
    }

    // == Purge Expired ==
    /// Removes all entries that are stale as of now.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now_ms();
        let mut state = self.state();

        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_fresh(now));
        let removed = before - state.entries.len();

        state.stats.record_expirations(removed);
        removed
    }

    // == Contains Key ==
    /// Returns true if `key` holds a fresh value.
    ///
    /// Unlike [`get`](Self::get) this neither evicts nor counts as a lookup.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.now_ms();
        self.state()
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now))
    }

    // == Dispose ==
    /// Stops the background sweep. Entries are left untouched.
    ///
    /// Safe to call repeatedly, and on a store that never started sweeping.
    pub fn dispose(&self) {
        if let Some(handle) = self.sweeper().take() {
            handle.abort();
            info!("Expiring store disposed, background sweep stopped");
        } else {
            debug!("Expiring store has no running sweep");
        }
    }

    /// Returns true while the background sweep is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    // == Length ==
    /// Returns the number of stored entries, including stale ones not yet
    /// evicted.
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    pub fn default_ttl_ms(&self) -> i64 {
        self.inner.default_ttl_ms
    }

    pub fn sweep_interval(&self) -> Duration {
        self.inner.sweep_interval
    }
}

impl<V: Clone> ExpiringStore<V> {
    // == Get ==
    /// Returns a clone of the value for `key` if it is still fresh.
    ///
    /// A stale entry found here is evicted on the spot and reported as
    /// absent, whether or not the sweep has reached it yet.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.now_ms();
        let mut state = self.state();

        let fresh = match state.entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.value.clone()),
            Some(_) => {
                state.entries.remove(key);
                state.stats.record_expirations(1);
                None
            }
            None => None,
        };

        if fresh.is_some() {
            state.stats.record_hit();
        } else {
            state.stats.record_miss();
        }
        fresh
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const T0: u64 = 1_700_000_000_000;

    fn manual_store<V: Clone + Send + 'static>() -> (ExpiringStore<V>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let store = ExpiringStore::with_clock(DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL_MS, clock.clone());
        (store, clock)
    }

    #[test]
    fn test_store_new_outside_runtime_does_not_sweep() {
        let store: ExpiringStore<String> = ExpiringStore::new(DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL_MS);
        assert!(store.is_empty());
        assert!(!store.is_sweeping());
        assert_eq!(store.default_ttl_ms(), DEFAULT_TTL_MS);
        assert_eq!(store.sweep_interval(), DEFAULT_SWEEP_INTERVAL);
    }

    #[test]
    fn test_store_set_and_get() {
        let (store, _clock) = manual_store();

        store.set("key1", "value1".to_string(), 1_000);
        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (store, _clock) = manual_store::<String>();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_falsy_values_are_hits() {
        let (store, _clock) = manual_store();

        store.set("zero", serde_json::json!(0), 1_000);
        store.set("false", serde_json::json!(false), 1_000);
        store.set("empty", serde_json::json!(""), 1_000);
        store.set("null", serde_json::Value::Null, 1_000);

        assert_eq!(store.get("zero"), Some(serde_json::json!(0)));
        assert_eq!(store.get("false"), Some(serde_json::json!(false)));
        assert_eq!(store.get("empty"), Some(serde_json::json!("")));
        assert_eq!(store.get("null"), Some(serde_json::Value::Null));
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let (store, clock) = manual_store();

        store.set("key1", 1, 1_000);
        clock.advance(900);
        store.set("key1", 2, 1_000);
        clock.advance(900);

        assert_eq!(store.get("key1"), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration_evicts_on_read() {
        let (store, clock) = manual_store();

        #[derive(Debug, Clone, PartialEq)]
        struct User {
            name: &'static str,
        }

        store.set("user:1", User { name: "A" }, 1_000);

        clock.advance(500);
        assert_eq!(store.get("user:1"), Some(User { name: "A" }));

        clock.advance(1_000);
        assert_eq!(store.len(), 1, "stale entry is kept until touched");
        assert_eq!(store.get("user:1"), None);
        assert_eq!(store.len(), 0, "stale entry is evicted by the read");
    }

    #[test]
    fn test_store_non_positive_ttl_is_absent() {
        let (store, _clock) = manual_store();

        store.set("zero", "v", 0);
        store.set("negative", "v", -5);

        assert_eq!(store.get("zero"), None);
        assert_eq!(store.get("negative"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_default_uses_configured_ttl() {
        let clock = Arc::new(ManualClock::new(T0));
        let store = ExpiringStore::with_clock(DEFAULT_SWEEP_INTERVAL, 2_000, clock.clone());

        store.set_default("key", "v");
        clock.advance(1_999);
        assert!(store.contains_key("key"));
        clock.advance(1);
        assert!(!store.contains_key("key"));
    }

    #[test]
    fn test_store_delete() {
        let (store, _clock) = manual_store();

        store.set("key1", "value1", 1_000);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let (store, _clock) = manual_store::<u8>();
        assert!(!store.delete("nonexistent"));
    }

    #[test]
    fn test_store_clear() {
        let (store, _clock) = manual_store();

        store.set("a", 1, 1_000);
        store.set("b", 2, 1_000);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_store_purge_expired() {
        let (store, clock) = manual_store();

        store.set("short", "value1", 1_000);
        store.set("long", "value2", 10_000);

        clock.advance(1_100);

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long"), Some("value2"));
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn test_store_contains_key_does_not_evict() {
        let (store, clock) = manual_store();

        store.set("key", "v", 100);
        clock.advance(100);

        assert!(!store.contains_key("key"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().misses, 0);
    }

    #[test]
    fn test_store_stats() {
        let (store, clock) = manual_store();

        store.set("key1", "value1", 1_000);
        store.set("key2", "value2", 10);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        clock.advance(50);
        store.get("key2"); // miss, lazily expired

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_clones_share_entries() {
        let (store, _clock) = manual_store();
        let other = store.clone();

        store.set("shared", 7, 1_000);
        assert_eq!(other.get("shared"), Some(7));

        other.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_dispose_without_sweep_is_noop() {
        let (store, _clock) = manual_store::<u8>();
        store.dispose();
        store.dispose();
        assert!(!store.is_sweeping());
    }

    #[tokio::test]
    async fn test_store_sweeps_when_built_inside_runtime() {
        let (store, _clock) = manual_store::<u8>();
        assert!(store.is_sweeping());

        store.set("kept", 1, 1_000);
        store.dispose();
        store.dispose();

        assert!(!store.is_sweeping());
        assert_eq!(store.get("kept"), Some(1), "dispose leaves entries in place");
    }

    #[tokio::test]
    async fn test_zero_sweep_interval_is_clamped() {
        let store: ExpiringStore<u8> = ExpiringStore::new(Duration::ZERO, DEFAULT_TTL_MS);
        assert_eq!(store.sweep_interval(), Duration::from_millis(1));
        store.dispose();
    }
}
