// src/config/polling.rs
// Adaptive polling configuration (4.5).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Starting interval between polls, seconds.
    pub base_interval: f64,
    /// Maximum interval after backoff, seconds.
    pub max_interval: f64,
    /// Multiplier applied to the interval once the quiet-poll threshold is
    /// crossed.
    pub backoff_factor: f64,
    /// Reset to `base_interval` when a poll observes new findings.
    pub reset_on_callback: bool,
    /// Maximum total polling duration, seconds.
    pub timeout: f64,
}

impl PollingConfig {
    pub fn from_env() -> Self {
        Self {
            base_interval: super::helpers::env_parsed_or("RICOCHET_POLL_BASE_INTERVAL", 5.0),
            max_interval: super::helpers::env_parsed_or("RICOCHET_POLL_MAX_INTERVAL", 60.0),
            backoff_factor: super::helpers::env_parsed_or("RICOCHET_POLL_BACKOFF_FACTOR", 1.5),
            reset_on_callback: super::helpers::env_parsed_or("RICOCHET_POLL_RESET_ON_CALLBACK", true),
            timeout: super::helpers::env_parsed_or("RICOCHET_POLL_TIMEOUT", 3600.0),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            base_interval: 5.0,
            max_interval: 60.0,
            backoff_factor: 1.5,
            reset_on_callback: true,
            timeout: 3600.0,
        }
    }
}
