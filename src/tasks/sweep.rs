//! Expiry Sweep Task
//!
//! Background task that periodically removes stale cache entries, bounding
//! memory held by keys that are written once and never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::WeakStore;

/// Spawns the sweep loop for a store.
///
/// The task holds only a weak handle: it ends on its own once every
/// `ExpiringStore` clone is dropped, and is otherwise stopped by aborting
/// the returned handle (what `ExpiringStore::dispose` does).
///
/// The first sweep runs one full `interval` after spawning.
pub(crate) fn spawn_sweep_task<V>(store: WeakStore<V>, interval: Duration) -> JoinHandle<()>
where
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting expiry sweep with interval of {} ms",
            interval.as_millis()
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(store) = store.upgrade() else {
                debug!("Expiring store dropped, ending sweep");
                break;
            };

            let removed = store.purge_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} stale entries", removed);
            } else {
                debug!("Expiry sweep: no stale entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::spawn_sweep_task;
    use crate::cache::{ExpiringStore, ManualClock};

    const SWEEP: Duration = Duration::from_millis(60_000);

    fn store_with_clock() -> (ExpiringStore<&'static str>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = ExpiringStore::with_clock(SWEEP, 3_600_000, clock.clone());
        (store, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_expired_entries() {
        let (store, clock) = store_with_clock();

        store.set("expire_soon", "value", 1_000);
        clock.advance(2_000);

        // Sweep fires at 60 s of (paused) runtime time
        tokio::time::sleep(SWEEP + Duration::from_millis(1)).await;

        assert_eq!(store.len(), 0, "stale entry should have been swept");
        assert_eq!(store.stats().expirations, 1);
        store.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_preserves_valid_entries() {
        let (store, clock) = store_with_clock();

        store.set("long_lived", "value", 3_600_000);
        clock.advance(120_000);

        tokio::time::sleep(SWEEP * 2 + Duration::from_millis(1)).await;

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long_lived"), Some("value"));
        store.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_does_not_run_before_first_interval() {
        let (store, clock) = store_with_clock();

        store.set("stale", "value", 10);
        clock.advance(20);

        tokio::time::sleep(SWEEP - Duration::from_millis(1)).await;

        assert_eq!(store.len(), 1, "stale entry waits for the first tick");
        store.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposed_store_stops_sweeping() {
        let (store, clock) = store_with_clock();

        store.set("stale", "value", 10);
        clock.advance(20);
        store.dispose();

        tokio::time::sleep(SWEEP * 3).await;

        assert!(!store.is_sweeping());
        assert_eq!(store.len(), 1, "no sweep after dispose");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_ends_when_store_dropped() {
        let (store, _clock) = store_with_clock();
        // Stop the store's own sweep and watch one we hold the handle of
        store.dispose();
        let handle = spawn_sweep_task(store.downgrade(), SWEEP);

        // Let the task start and wait on its first real tick
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        drop(store);
        tokio::time::sleep(SWEEP + Duration::from_millis(1)).await;

        assert!(handle.is_finished(), "sweep should exit once the store is gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_keeps_running_while_a_clone_lives() {
        let (store, _clock) = store_with_clock();
        store.dispose();
        let clone = store.clone();
        let handle = spawn_sweep_task(store.downgrade(), SWEEP);

        drop(store);
        tokio::time::sleep(SWEEP * 2 + Duration::from_millis(1)).await;

        assert!(!handle.is_finished());
        handle.abort();
        drop(clone);
    }
}
