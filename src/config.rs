//! Configuration Module
//!
//! Expiry settings for lazy values, loadable from serde sources or the
//! process environment.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::ExpiryPolicy;
use crate::error::{LazyError, Result};

/// Environment variable holding the TTL in milliseconds.
pub const TTL_MS_VAR: &str = "LAZY_TTL_MS";

/// Environment variable toggling the TTL clock reset on failed loads.
pub const RESET_TTL_ON_FAILURE_VAR: &str = "LAZY_RESET_TTL_ON_FAILURE";

/// Expiry configuration for a lazy value.
///
/// `ttl_ms: None` disables TTL mode; `Some(0)` enables it with an empty
/// window, so every access after the first load reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyConfig {
    /// Time-to-live of cached values in milliseconds
    pub ttl_ms: Option<u64>,
    /// Whether a failed load restarts the TTL clock of its key
    pub reset_ttl_on_failure: bool,
}

impl LazyConfig {
    /// Creates a config with TTL mode enabled.
    ///
    /// The window is stored in whole milliseconds. A non-zero window shorter
    /// than a millisecond rounds up to one, and windows beyond `u64::MAX`
    /// milliseconds saturate.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl_ms: Some(ttl_to_millis(ttl)),
            ..Self::default()
        }
    }

    /// Loads the config from environment variables, failing on malformed
    /// values.
    ///
    /// # Environment Variables
    /// - `LAZY_TTL_MS` - TTL in milliseconds (default: unset, TTL disabled)
    /// - `LAZY_RESET_TTL_ON_FAILURE` - `true`/`false`/`1`/`0`/`yes`/`no`,
    ///   case-insensitive (default: true)
    pub fn try_from_env() -> Result<Self> {
        let ttl_ms = match read_var(TTL_MS_VAR) {
            None => None,
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| LazyError::InvalidEnv {
                var: TTL_MS_VAR,
                value: raw.clone(),
            })?),
        };

        let reset_ttl_on_failure = match read_var(RESET_TTL_ON_FAILURE_VAR) {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or(LazyError::InvalidEnv {
                var: RESET_TTL_ON_FAILURE_VAR,
                value: raw,
            })?,
        };

        Ok(Self {
            ttl_ms,
            reset_ttl_on_failure,
        })
    }

    /// Loads the config from environment variables, using defaults when a
    /// value is malformed.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|err| {
            warn!("{}, falling back to default lazy config", err);
            Self::default()
        })
    }

    /// The TTL window, `None` when TTL mode is off.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }

    /// Builds the expiry policy described by this config.
    pub fn policy(&self) -> ExpiryPolicy {
        let policy = match self.ttl() {
            Some(ttl) => ExpiryPolicy::ttl(ttl),
            None => ExpiryPolicy::disabled(),
        };
        policy.reset_on_failure(self.reset_ttl_on_failure)
    }
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            ttl_ms: None,
            reset_ttl_on_failure: true,
        }
    }
}

fn ttl_to_millis(ttl: Duration) -> u64 {
    if ttl > Duration::ZERO && ttl < Duration::from_millis(1) {
        return 1;
    }
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

/// Reads a variable, treating empty values as unset.
fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
