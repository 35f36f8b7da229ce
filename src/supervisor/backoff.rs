//! Retry spacing
//!
//! Doubling backoff between a floor and a ceiling. The supervisor resets it
//! on most error classes and only grows it on the repeat-failure path; see
//! the transition policy in the supervisor module.

use std::time::Duration;

/// Doubling backoff clamped between a floor and a ceiling
#[derive(Debug, Clone)]
pub struct Backoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        Self {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// The delay a sleep taken right now should use.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Drop back to the floor.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// Double the interval, capped at the ceiling.
    pub fn advance(&mut self) {
        self.current = (self.current * 2).min(self.ceiling);
    }
}

impl Default for Backoff {
    fn default() -> Self {
        // Matches the historical reconnect policy: 1s floor, 5min ceiling.
        Self::new(Duration::from_secs(1), Duration::from_secs(300))
    }
}
