// src/injector/transport.rs
// Transmission contract (4.3): TLS verification off by default, optional
// proxy override, redirects followed, timeout enforced.

use crate::config::injector::InjectorConfig;
use crate::error::{RicochetError, RicochetResult};
use std::collections::BTreeMap;
use std::time::Duration;

pub struct TransportResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

pub fn build_client(config: &InjectorConfig) -> RicochetResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_tls)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        });

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| RicochetError::InvalidConfig(format!("invalid proxy url: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RicochetError::InvalidConfig(format!("failed to build http client: {e}")))
}

/// Send a prepared request as-is. Timeouts map to `TimeoutError`, other
/// transport failures to `ConnectionError`; any HTTP response, including
/// 4xx/5xx, is a successful return.
pub async fn send(
    client: &reqwest::Client,
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<Vec<u8>>,
) -> RicochetResult<TransportResponse> {
    let method = reqwest::Method::from_bytes(method.as_bytes())
        .map_err(|_| RicochetError::MalformedRequest(format!("invalid HTTP method {method:?}")))?;

    let mut request = client.request(method, url);
    for (name, value) in headers {
        request = request.header(name, value);
    }
    if let Some(body) = body {
        request = request.body(body);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            RicochetError::TimeoutError(e.to_string())
        } else {
            RicochetError::ConnectionError(e.to_string())
        }
    })?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    Ok(TransportResponse { status, headers })
}
