//! Quiet-period debouncing for the free-text filter
//!
//! The debouncer is a clock-driven state machine: callers report the raw
//! value with [`Debouncer::observe`] and advance it with [`Debouncer::poll`].
//! It uses `tokio::time::Instant` so paused-clock tests control it.

use std::time::Duration;
use tokio::time::Instant;

/// Default quiet period before a keystroke reaches the network
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    latest: T,
    settled: T,
    deadline: Option<Instant>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, quiet: Duration) -> Self {
        Self {
            quiet,
            latest: initial.clone(),
            settled: initial,
            deadline: None,
        }
    }

    /// Record the raw value as of `now`
    ///
    /// A changed value restarts the quiet period. Reporting the same value
    /// again does not.
    pub fn observe(&mut self, value: &T, now: Instant) {
        if *value == self.latest {
            return;
        }
        self.latest = value.clone();
        self.deadline = if self.latest == self.settled {
            None
        } else {
            Some(now + self.quiet)
        };
    }

    /// Promote the raw value once the quiet period has elapsed
    ///
    /// Returns the newly settled value, if it changed.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.settled = self.latest.clone();
                Some(&self.settled)
            }
            _ => None,
        }
    }

    /// Settle immediately, skipping the quiet period
    pub fn flush(&mut self) -> bool {
        let changed = self.deadline.take().is_some();
        self.settled = self.latest.clone();
        changed
    }

    /// Value the network is allowed to see
    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// Most recent raw value
    pub fn latest(&self) -> &T {
        &self.latest
    }

    /// When the pending value will settle, if one is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }
}
