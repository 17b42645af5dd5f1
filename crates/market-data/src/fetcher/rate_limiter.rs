//! Minimum-interval rate limiter for marketplace accounts.
//!
//! Each account key (usually `"{MARKETPLACE}:{account}"`) owns a slot schedule.
//! `acquire` reserves the next free slot and sleeps until it opens, so
//! concurrent callers line up exactly one interval apart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::constants::DEFAULT_RATE_LIMIT_INTERVAL;

/// Slot schedule for a single account.
#[derive(Debug)]
struct SlotSchedule {
    /// Earliest instant the next request may start.
    next_at: Instant,
    /// Spacing between consecutive requests.
    interval: Duration,
}

impl SlotSchedule {
    fn new(interval: Duration) -> Self {
        Self {
            next_at: Instant::now(),
            interval,
        }
    }

    /// Reserve the next slot and return how long the caller must wait for it.
    fn reserve(&mut self, now: Instant) -> Duration {
        let slot = self.next_at.max(now);
        self.next_at = slot + self.interval;
        slot.saturating_duration_since(now)
    }
}

/// Rate limiter keeping a fixed minimum spacing per account.
///
/// Thread-safe; schedules are created on demand with the default interval
/// unless an account was configured beforehand.
pub struct RateLimiter {
    schedules: Mutex<HashMap<String, SlotSchedule>>,
    intervals: Mutex<HashMap<String, Duration>>,
    default_interval: Duration,
}

impl RateLimiter {
    /// Create a rate limiter using the default ~1.1s spacing.
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_RATE_LIMIT_INTERVAL)
    }

    /// Create a rate limiter with a custom default spacing.
    pub fn with_interval(default_interval: Duration) -> Self {
        Self {
            schedules: Mutex::new(HashMap::new()),
            intervals: Mutex::new(HashMap::new()),
            default_interval,
        }
    }

    /// Lock the schedules mutex, recovering from poison if necessary.
    ///
    /// Worst case after a poisoned lock is one slightly mistimed request,
    /// which beats panicking inside a sync run.
    fn lock_schedules(&self) -> MutexGuard<'_, HashMap<String, SlotSchedule>> {
        self.schedules.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter schedules mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_intervals(&self) -> MutexGuard<'_, HashMap<String, Duration>> {
        self.intervals.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter intervals mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set the spacing for a specific account.
    pub fn configure(&self, account: &str, interval: Duration) {
        let mut intervals = self.lock_intervals();
        intervals.insert(account.to_string(), interval);
        drop(intervals); // Release intervals lock before acquiring schedules lock

        let mut schedules = self.lock_schedules();
        schedules.remove(account);
    }

    /// Spacing applied to `account`.
    pub fn interval_for(&self, account: &str) -> Duration {
        self.lock_intervals()
            .get(account)
            .copied()
            .unwrap_or(self.default_interval)
    }

    /// Wait (asynchronously) for the account's next slot.
    pub async fn acquire(&self, account: &str) {
        let wait_time = {
            let interval = self.interval_for(account);
            let mut schedules = self.lock_schedules();
            schedules
                .entry(account.to_string())
                .or_insert_with(|| SlotSchedule::new(interval))
                .reserve(Instant::now())
        };

        if wait_time > Duration::ZERO {
            debug!("Rate limiter: waiting {:?} for '{}'", wait_time, account);
            tokio::time::sleep(wait_time).await;
        } else {
            debug!("Rate limiter: slot open for '{}'", account);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
