//! Cache Module
//!
//! In-memory expiring store with lazy and periodic expiry, plus the
//! cache-first accessor built on top of it.

mod accessor;
mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use accessor::cached_fetch;
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{ExpiringStore, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL_MS};

pub(crate) use store::WeakStore;
