//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a store.
//!
//! # Tasks
//! - Expiry Sweep: Removes stale cache entries at the configured interval

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
