//! Registrar tuning knobs. Deserializable so an operator can override any
//! field in the service config; every field has a default.

use std::time::Duration;

use serde::Deserialize;

/// Consecutive validation failures before a production library is demoted.
pub const DEFAULT_DEMOTION_THRESHOLD: u32 = 3;

/// Per-request timeout for document fetches, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Per-request timeout for external geocoder calls, in seconds.
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 5;

/// Registrar configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Consecutive failures tolerated before production → testing demotion.
    pub demotion_threshold: u32,
    /// Document fetch timeout, seconds.
    pub fetch_timeout_secs: u64,
    /// External geocoder timeout, seconds.
    pub geocoder_timeout_secs: u64,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            demotion_threshold: DEFAULT_DEMOTION_THRESHOLD,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            geocoder_timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECS,
        }
    }
}

impl RegistrarConfig {
    /// Document fetch timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Geocoder timeout as a `Duration`.
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder_timeout_secs)
    }
}
