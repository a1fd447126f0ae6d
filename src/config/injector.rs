// src/config/injector.rs
// Injector transmission configuration (4.3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectorConfig {
    /// Operation timeout for outbound HTTP requests, in seconds.
    pub timeout_secs: u64,
    /// HTTPS certificate verification. Disabled by default: security
    /// testing against self-signed targets is expected.
    pub verify_tls: bool,
    /// Explicit proxy URL; overrides environment proxy detection for both
    /// HTTP and HTTPS when set.
    pub proxy: Option<String>,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Base callback URL, e.g. `http://cb.example`. Trailing slashes are
    /// trimmed at use time.
    pub callback_base_url: String,
}

impl InjectorConfig {
    pub fn from_env() -> Self {
        Self {
            timeout_secs: super::helpers::env_parsed_or("RICOCHET_HTTP_TIMEOUT_SECS", 10),
            verify_tls: super::helpers::env_parsed_or("RICOCHET_VERIFY_TLS", false),
            proxy: std::env::var("RICOCHET_PROXY").ok(),
            follow_redirects: super::helpers::env_parsed_or("RICOCHET_FOLLOW_REDIRECTS", true),
            callback_base_url: super::helpers::env_or(
                "RICOCHET_CALLBACK_BASE_URL",
                "http://localhost:8080",
            ),
        }
    }
}
