// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limited deferred invocation: run a callback at most every `interval`.
//!
//! The timer is reset using wall-clock time taken *after* the callback runs,
//! while the main loop compares `time_to_next` against the timestamp at the
//! *start* of the iteration. This preserves an observed drift in the system
//! this was ported from: slow callbacks push their own next firing out
//! further than `interval` alone would suggest. Do not "fix" this.

use std::time::{Duration, Instant};

pub struct PeriodicAction {
    interval: Duration,
    last: Instant,
}

impl PeriodicAction {
    pub fn new(interval: Duration, now: Instant) -> Self {
        PeriodicAction { interval, last: now }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time remaining until this action is next due, floored at zero.
    pub fn time_to_next(&self, now: Instant) -> Duration {
        let due = self.last + self.interval;
        due.saturating_duration_since(now)
    }

    fn is_due(&self, now: Instant) -> bool {
        now > self.last + self.interval
    }

    /// Run `callback` if due, then reset the timer to `Instant::now()` taken
    /// after the callback completes (see module docs for why the reset
    /// happens post-callback rather than against `now`).
    pub async fn try_action<F, Fut>(&mut self, now: Instant, callback: F)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        if self.is_due(now) {
            callback().await;
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

#[cfg(test)]
#[path = "periodic_tests.rs"]
mod tests;
