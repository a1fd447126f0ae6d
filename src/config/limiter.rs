// src/config/limiter.rs
// Token-bucket rate limiter configuration (4.1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Tokens per second. Must be > 0.
    pub rate: f64,
    /// Bucket capacity. Must be >= 1.
    pub burst: u32,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            rate: super::helpers::env_parsed_or("RICOCHET_RATE_LIMIT", 10.0),
            burst: super::helpers::env_parsed_or("RICOCHET_RATE_BURST", 1),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { rate: 10.0, burst: 1 }
    }
}
