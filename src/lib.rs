//! Expiring Cache - A process-wide in-memory TTL cache
//!
//! Provides a shared expiring key/value store with lazy and periodic expiry,
//! and a cache-first fetch helper on top of it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::AppState;
pub use cache::{cached_fetch, CacheStats, ExpiringStore};
pub use config::Config;
