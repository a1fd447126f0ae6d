// src/config/server.rs
// Callback server bind configuration and ambient logging configuration.

use crate::error::{RicochetError, RicochetResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// HTTP callback server configuration (4.4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl HttpServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: super::helpers::env_or("RICOCHET_HTTP_HOST", "0.0.0.0"),
            port: super::helpers::env_parsed_or("RICOCHET_HTTP_PORT", 8080),
        }
    }

    pub fn bind_address(&self) -> RicochetResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| RicochetError::InvalidConfig(format!("invalid http bind address: {e}")))
    }
}

/// DNS callback server configuration (4.4.2). Default port 5353 since the
/// privileged port 53 typically requires root; deployments that own an
/// authoritative zone rebind as needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsServerConfig {
    pub host: String,
    pub port: u16,
}

impl DnsServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: super::helpers::env_or("RICOCHET_DNS_HOST", "0.0.0.0"),
            port: super::helpers::env_parsed_or("RICOCHET_DNS_PORT", 5353),
        }
    }

    pub fn bind_address(&self) -> RicochetResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| RicochetError::InvalidConfig(format!("invalid dns bind address: {e}")))
    }
}

/// Structured logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: super::helpers::env_or("RICOCHET_LOG_LEVEL", "info"),
        }
    }
}
