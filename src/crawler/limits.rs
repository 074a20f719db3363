//! Rate limiting and randomized inter-request delays
//!
//! This module bounds how often jobs may start:
//! - [`RateLimiter`] caps request starts at R per fixed window W
//! - [`DelayRange`] adds a uniformly sampled extra wait per scheduled job
//!
//! Both are consulted by the coordinator at scheduling time, from its single
//! logical thread, so neither needs interior locking. Timekeeping uses
//! `tokio::time::Instant` so paused-clock tests observe the virtual clock.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Fixed-window rate limiter
///
/// `consume()` is non-blocking: it returns the additional wait the caller
/// must observe before starting a request so that aggregate starts stay at
/// or below `requests_per_window` per `window`. A start within the current
/// window's budget is recorded immediately and waits zero; once the budget
/// is exhausted, callers are told to wait until the window resets (that
/// deferred start is not recorded against the next window).
#[derive(Debug)]
pub struct RateLimiter {
    requests_per_window: Option<u32>,
    window: Duration,
    window_start: Instant,
    started: u32,
}

impl RateLimiter {
    /// Creates a limiter allowing `requests_per_window` starts per `window`
    pub fn new(requests_per_window: u32, window: Duration) -> Self {
        Self {
            requests_per_window: Some(requests_per_window),
            window,
            window_start: Instant::now(),
            started: 0,
        }
    }

    /// Creates a no-op limiter that never asks callers to wait
    pub fn unlimited() -> Self {
        Self {
            requests_per_window: None,
            window: Duration::ZERO,
            window_start: Instant::now(),
            started: 0,
        }
    }

    /// Accounts for one request start and returns the wait it must observe
    pub fn consume(&mut self) -> Duration {
        let Some(limit) = self.requests_per_window else {
            return Duration::ZERO;
        };

        let now = Instant::now();
        let elapsed = now.duration_since(self.window_start);
        if elapsed >= self.window {
            self.window_start = now;
            self.started = 0;
        }

        if self.started < limit {
            self.started += 1;
            Duration::ZERO
        } else {
            self.window - now.duration_since(self.window_start)
        }
    }
}

/// Randomized additional wait applied per scheduled job
///
/// `next()` samples uniformly from `[min, max]`; with `min == max` the
/// delay is deterministic, which the timing tests rely on.
#[derive(Debug, Clone, Copy)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Creates a delay range; `max` below `min` is clamped up to `min`
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Creates a deterministic delay of exactly `value`
    pub fn fixed(value: Duration) -> Self {
        Self::new(value, value)
    }

    /// Samples the wait for one scheduled job
    pub fn next(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }

        let span = (self.max - self.min).as_millis() as u64;
        let offset = rand::thread_rng().gen_range(0..=span);
        self.min + Duration::from_millis(offset)
    }
}
