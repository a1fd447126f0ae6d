// src/config/mod.rs
// Central configuration for Ricochet - composes all domain configs.

pub mod helpers;
pub mod injector;
pub mod limiter;
pub mod polling;
pub mod server;
pub mod store;

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub static CONFIG: LazyLock<RicochetConfig> = LazyLock::new(RicochetConfig::from_env);

/// Top-level configuration structure - composes all domain configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RicochetConfig {
    pub store: store::StoreConfig,
    pub http_server: server::HttpServerConfig,
    pub dns_server: server::DnsServerConfig,
    pub logging: server::LoggingConfig,
    pub rate_limit: limiter::RateLimitConfig,
    pub injector: injector::InjectorConfig,
    pub polling: polling::PollingConfig,
}

impl RicochetConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Don't fail if .env doesn't exist.

        Self {
            store: store::StoreConfig::from_env(),
            http_server: server::HttpServerConfig::from_env(),
            dns_server: server::DnsServerConfig::from_env(),
            logging: server::LoggingConfig::from_env(),
            rate_limit: limiter::RateLimitConfig::from_env(),
            injector: injector::InjectorConfig::from_env(),
            polling: polling::PollingConfig::from_env(),
        }
    }
}

impl Default for RicochetConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
