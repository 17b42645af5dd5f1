//! Background scheduler for periodic market sync.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Starts the background market sync scheduler. A zero interval disables it.
pub fn start_market_sync_scheduler(state: Arc<AppState>, every: Duration, initial_delay: Duration) {
    if every.is_zero() {
        info!("Market sync scheduler disabled");
        return;
    }
    if state.marketplaces.is_empty() {
        warn!("Market sync scheduler not started: no marketplace credentials configured");
        return;
    }

    tokio::spawn(async move {
        info!("Market sync scheduler started ({}s interval)", every.as_secs());

        tokio::time::sleep(initial_delay).await;

        // First tick is immediate.
        let mut sync_interval = interval(every);
        sync_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            sync_interval.tick().await;
            run_scheduled_sync(&state).await;
        }
    });
}

async fn run_scheduled_sync(state: &Arc<AppState>) {
    info!("Running scheduled market sync...");

    match state
        .scheduled_sync
        .run(state.sync_budget, state.sync_max_items)
        .await
    {
        Ok(summary) => {
            info!(
                "Scheduled market sync completed: {} items, {}/{} runs successful",
                summary.items_attempted,
                summary.successes(),
                summary.results.len()
            );
            if summary.deadline_reached {
                info!(
                    "Sync budget reached, {} items left for the next run",
                    summary.items_skipped
                );
            }
        }
        Err(e) => warn!("Scheduled market sync failed: {}", e),
    }
}
