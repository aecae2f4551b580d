//! Background driver for the hold expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::orchestrator::BookingOrchestrator;

/// Run the expiry sweep on a fixed interval until the task is aborted.
pub fn spawn_sweeper(
    orchestrator: Arc<BookingOrchestrator>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh start does
        // not race holds created during boot.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let swept = orchestrator.sweep_expired().await;
            if swept > 0 {
                info!(swept, "expiry sweep released holds");
            }
        }
    })
}
