//! Retention sweeper
//!
//! Periodically evicts finished jobs older than the retention window so a
//! long-running process does not grow without bound.

use barrage_core::store::{JobStore, StoreError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

/// Evicts terminal jobs that finished more than `retention` ago
pub async fn sweep_once(store: &dyn JobStore, retention: Duration) -> Result<usize, StoreError> {
    let Some(cutoff) = chrono::Duration::from_std(retention)
        .ok()
        .and_then(|window| Utc::now().checked_sub_signed(window))
    else {
        return Ok(0);
    };

    store.evict_finished_before(cutoff).await
}

/// Starts the background sweep loop
pub fn spawn_retention_sweeper(
    store: Arc<dyn JobStore>,
    retention: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(
        "Retention sweeper started (retention: {:?}, interval: {:?})",
        retention, interval
    );

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match sweep_once(store.as_ref(), retention).await {
                Ok(0) => debug!("Retention sweep: nothing to evict"),
                Ok(evicted) => info!("Retention sweep evicted {} job(s)", evicted),
                Err(e) => warn!("Retention sweep failed: {}", e),
            }
        }
    })
}
