//! Debounce and throttle helpers driven by caller-supplied instants.
//!
//! The grid has no timer thread. Callers pass `now` into every method and
//! call the grid's `poll_timers` from their event loop; that keeps the
//! behavior deterministic under test.

use std::time::{Duration, Instant};

/// Holds the most recent value until `delay` has passed without a newer one.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the delay.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }
}

/// Lets at most one value through per interval. Values arriving inside the
/// interval are coalesced; the latest one is released by `flush`.
#[derive(Clone, Debug)]
pub struct Throttle<T> {
    interval: Duration,
    last_fired: Option<Instant>,
    trailing: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            trailing: None,
        }
    }

    /// Returns the value if it may be applied now, otherwise keeps it as
    /// the trailing value.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.ready(now) {
            self.last_fired = Some(now);
            self.trailing = None;
            Some(value)
        } else {
            self.trailing = Some(value);
            None
        }
    }

    /// Release the trailing value once the interval has elapsed.
    pub fn flush(&mut self, now: Instant) -> Option<T> {
        if self.trailing.is_some() && self.ready(now) {
            self.last_fired = Some(now);
            self.trailing.take()
        } else {
            None
        }
    }

    pub fn has_trailing(&self) -> bool {
        self.trailing.is_some()
    }

    pub fn cancel(&mut self) {
        self.trailing = None;
    }

    fn ready(&self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }
}
