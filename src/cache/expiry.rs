//! Expiry Policy Module
//!
//! Decides at read time whether a cached value has outlived its TTL.

use std::time::{Duration, Instant};

// == Expiry Policy ==
/// TTL configuration of a lazy value.
///
/// `ttl: None` disables TTL mode entirely. `Some(Duration::ZERO)` is an
/// enabled TTL with an empty window, which is not the same thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    ttl: Option<Duration>,
    reset_on_failure: bool,
}

impl ExpiryPolicy {
    // == Constructors ==
    /// Policy with TTL mode disabled; cached values never expire.
    pub fn disabled() -> Self {
        Self {
            ttl: None,
            reset_on_failure: true,
        }
    }

    /// Policy with TTL mode enabled for the given window.
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            reset_on_failure: true,
        }
    }

    /// Sets whether a failed load restarts the key's TTL clock.
    ///
    /// Defaults to `true`: a failing loader is retried only after a full
    /// window. With `false` only successful loads are timestamped.
    pub fn reset_on_failure(mut self, reset: bool) -> Self {
        self.reset_on_failure = reset;
        self
    }

    // == Accessors ==
    /// The configured window, `None` when TTL mode is off.
    pub fn window(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns true if TTL mode is on.
    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Returns true if failed loads restart the TTL clock.
    pub fn resets_on_failure(&self) -> bool {
        self.reset_on_failure
    }

    // == Is Expired ==
    /// Checks whether a value computed at `computed_at` is stale.
    ///
    /// Expired means strictly more than the window has elapsed. A missing
    /// timestamp (preloaded value, or TTL mode off) is never expired.
    pub fn is_expired(&self, computed_at: Option<Instant>) -> bool {
        match (self.ttl, computed_at) {
            (Some(ttl), Some(at)) => at.elapsed() > ttl,
            _ => false,
        }
    }

    // == Time Remaining ==
    /// Remaining lifetime of a value computed at `computed_at`.
    ///
    /// # Returns
    /// - `None` if TTL mode is off or the value carries no timestamp
    /// - `Some(Duration::ZERO)` once the window has elapsed
    pub fn remaining(&self, computed_at: Option<Instant>) -> Option<Duration> {
        match (self.ttl, computed_at) {
            (Some(ttl), Some(at)) => Some(ttl.saturating_sub(at.elapsed())),
            _ => None,
        }
    }

    // == Should Stamp ==
    /// Whether a load with the given outcome records a new timestamp.
    pub fn should_stamp(&self, succeeded: bool) -> bool {
        self.is_enabled() && (succeeded || self.reset_on_failure)
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
