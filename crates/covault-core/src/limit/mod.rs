//! Rolling daily spending limit.
//!
//! Tracks cumulative value reserved through the low-confirmation bypass path
//! within a rolling 24-hour window. The window is rolled forward lazily on
//! access rather than by a background timer, so the engine stays free of
//! scheduled execution: when an operation observes that the window anchor is
//! at least 24 hours old, the spent counter resets and the anchor advances
//! to the observation time.

use serde::{Deserialize, Serialize};

/// Length of the rolling spending window, in seconds.
pub const DAILY_WINDOW_SECS: u64 = 86_400;

/// Bookkeeping for the rolling 24-hour spending cap.
///
/// Mutated only by successful reservations ([`DailyLimitTracker::try_reserve`])
/// and by rollback of a reservation whose settlement failed
/// ([`DailyLimitTracker::release`]). Callers serialize access through the
/// engine; the tracker itself is plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLimitTracker {
    /// Configured cap in base units. Immutable.
    limit: u64,
    /// Value reserved within the current window.
    spent_in_window: u64,
    /// Unix-seconds timestamp anchoring the current window.
    window_start: u64,
}

impl DailyLimitTracker {
    /// Creates a tracker with the given cap and an empty window anchored at
    /// time zero, so the first access rolls it to the caller's clock.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            spent_in_window: 0,
            window_start: 0,
        }
    }

    /// The configured cap in base units.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Value reserved in the window as last rolled. Callers interested in
    /// the current window should use [`DailyLimitTracker::remaining`].
    #[must_use]
    pub const fn spent_in_window(&self) -> u64 {
        self.spent_in_window
    }

    /// Capacity still available at `now`, accounting for a window rollover
    /// without committing it.
    #[must_use]
    pub fn remaining(&self, now: u64) -> u64 {
        if self.window_elapsed(now) {
            self.limit
        } else {
            self.limit - self.spent_in_window
        }
    }

    /// Attempts to reserve `amount` against the window at `now`.
    ///
    /// Rolls the window forward if it is stale, then commits
    /// `spent_in_window += amount` and returns `true` iff the amount fits.
    /// On `false` the state is unchanged apart from the rollover.
    pub fn try_reserve(&mut self, now: u64, amount: u64) -> bool {
        self.rollover(now);
        if amount <= self.limit - self.spent_in_window {
            self.spent_in_window += amount;
            true
        } else {
            false
        }
    }

    /// Rolls back a reservation whose settlement failed, so a retried
    /// execute is not double-counted. Saturates at zero.
    pub fn release(&mut self, amount: u64) {
        self.spent_in_window = self.spent_in_window.saturating_sub(amount);
    }

    fn window_elapsed(&self, now: u64) -> bool {
        now.saturating_sub(self.window_start) >= DAILY_WINDOW_SECS
    }

    fn rollover(&mut self, now: u64) {
        if self.window_elapsed(now) {
            self.spent_in_window = 0;
            self.window_start = now;
        }
    }
}
