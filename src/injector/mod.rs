// src/injector/mod.rs
// Substitutes correlation IDs into payload templates, mutates a target
// request at a chosen vector, transmits, and records the injection (4.3).

pub mod mutate;
pub mod request;
pub mod substitution;
pub mod transport;
pub mod vectors;

use crate::config::injector::InjectorConfig;
use crate::correlation;
use crate::error::RicochetResult;
use crate::limiter::RateLimiter;
use crate::model::InjectionRecord;
use crate::store::Store;
use request::ParsedRequest;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use vectors::{InjectionVector, VectorLocation};

/// Outcome of a single injection attempt. The injection row is recorded
/// regardless of `success`, so a callback that arrives anyway can still
/// correlate.
#[derive(Debug, Clone)]
pub struct InjectionResult {
    pub correlation_id: String,
    pub vector: InjectionVector,
    pub url: String,
    /// HTTP status, or 0 for dry-run / error outcomes.
    pub status: u16,
    pub success: bool,
    pub error: Option<String>,
}

pub struct Injector {
    store: Store,
    rate_limiter: RateLimiter,
    client: reqwest::Client,
    config: InjectorConfig,
}

impl Injector {
    pub fn new(store: Store, rate_limiter: RateLimiter, config: InjectorConfig) -> RicochetResult<Self> {
        let client = transport::build_client(&config)?;
        Ok(Self {
            store,
            rate_limiter,
            client,
            config,
        })
    }

    /// Inject `payload_template` at a single vector. See 4.3 for the
    /// ordering contract: record, then rate-limit, then send.
    pub async fn inject_vector(
        &self,
        request: &ParsedRequest,
        vector: &InjectionVector,
        payload_template: &str,
        context: Option<String>,
        dry_run: bool,
    ) -> RicochetResult<InjectionResult> {
        let correlation_id = correlation::generate();
        let callback_url = substitution::callback_url(&self.config.callback_base_url, &correlation_id);
        let payload = substitution::substitute_callback(payload_template, &callback_url);

        let (target_url, headers, body) = mutate_for_vector(request, vector, &payload)?;

        let record = InjectionRecord {
            id: correlation_id.clone(),
            target_url: target_url.clone(),
            parameter: vector.qualified_name(),
            payload: payload.clone(),
            context,
            injected_at: wall_clock_now(),
        };
        self.store.record_injection(&record).await?;

        if dry_run {
            info!(correlation_id = %correlation_id, "dry-run injection, not sent");
            return Ok(InjectionResult {
                correlation_id,
                vector: vector.clone(),
                url: target_url,
                status: 0,
                success: true,
                error: Some("[dry-run] Request not sent".to_string()),
            });
        }

        self.rate_limiter.acquire(true).await;

        match transport::send(&self.client, &request.method, &target_url, &headers, body).await {
            Ok(response) => Ok(InjectionResult {
                correlation_id,
                vector: vector.clone(),
                url: target_url,
                status: response.status,
                success: true,
                error: None,
            }),
            Err(e) => {
                warn!(correlation_id = %correlation_id, error = %e, "injection transmission failed");
                Ok(InjectionResult {
                    correlation_id,
                    vector: vector.clone(),
                    url: target_url,
                    status: 0,
                    success: false,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    /// Inject the same payload template across every extractable vector on
    /// `request`.
    pub async fn inject_all_vectors(
        &self,
        request: &ParsedRequest,
        payload_template: &str,
        context: Option<String>,
        dry_run: bool,
    ) -> RicochetResult<Vec<InjectionResult>> {
        let mut results = Vec::new();
        for vector in vectors::extract_vectors(request) {
            results.push(
                self.inject_vector(request, &vector, payload_template, context.clone(), dry_run)
                    .await?,
            );
        }
        Ok(results)
    }

    /// Inject a single named parameter, regardless of which location it
    /// occupies. Returns `None` if `name` isn't an extractable vector.
    pub async fn inject_single_param(
        &self,
        request: &ParsedRequest,
        name: &str,
        payload_template: &str,
        context: Option<String>,
        dry_run: bool,
    ) -> RicochetResult<Option<InjectionResult>> {
        let Some(vector) = vectors::extract_vectors(request).into_iter().find(|v| v.name == name) else {
            return Ok(None);
        };
        self.inject_vector(request, &vector, payload_template, context, dry_run)
            .await
            .map(Some)
    }
}

fn mutate_for_vector(
    request: &ParsedRequest,
    vector: &InjectionVector,
    payload: &str,
) -> RicochetResult<(String, Vec<(String, String)>, Option<Vec<u8>>)> {
    match vector.location {
        VectorLocation::Query => {
            let target_url = mutate::mutate_query(&request.url, &vector.name, payload);
            Ok((target_url, request.headers.clone(), request.body.clone()))
        }
        VectorLocation::Header => {
            let headers = mutate::mutate_header(&request.headers, &vector.name, payload);
            Ok((request.url.clone(), headers, request.body.clone()))
        }
        VectorLocation::Cookie => {
            let cookie_header = request.cookie_header().unwrap_or_default();
            let new_cookie = mutate::mutate_cookie(cookie_header, &vector.name, payload);
            let headers = set_header(request.headers.clone(), "Cookie", new_cookie);
            Ok((request.url.clone(), headers, request.body.clone()))
        }
        VectorLocation::Body => {
            let body_text = body_as_text(request)?;
            let new_body = mutate::mutate_form_body(&body_text, &vector.name, payload);
            let headers = set_header(
                request.headers.clone(),
                "Content-Length",
                new_body.len().to_string(),
            );
            Ok((request.url.clone(), headers, Some(new_body.into_bytes())))
        }
        VectorLocation::Json => {
            let body_text = body_as_text(request)?;
            let new_body = mutate::mutate_json_body(&body_text, &vector.name, payload)?;
            let headers = set_header(
                request.headers.clone(),
                "Content-Length",
                new_body.len().to_string(),
            );
            Ok((request.url.clone(), headers, Some(new_body.into_bytes())))
        }
    }
}

fn body_as_text(request: &ParsedRequest) -> RicochetResult<String> {
    let body = request
        .body
        .as_ref()
        .ok_or_else(|| crate::error::RicochetError::MalformedRequest("vector targets a missing body".into()))?;
    String::from_utf8(body.clone())
        .map_err(|e| crate::error::RicochetError::MalformedRequest(format!("body is not valid UTF-8: {e}")))
}

fn set_header(headers: Vec<(String, String)>, name: &str, value: String) -> Vec<(String, String)> {
    let mut found = false;
    let mut out: Vec<(String, String)> = headers
        .into_iter()
        .map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                found = true;
                (k, value.clone())
            } else {
                (k, v)
            }
        })
        .collect();
    if !found {
        out.push((name.to_string(), value));
    }
    out
}

fn wall_clock_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::limiter::RateLimitConfig;
    use request::ParsedRequest;

    async fn test_injector() -> Injector {
        let store = Store::open_in_memory().await.unwrap();
        let rate_limit = RateLimitConfig { rate: 1000.0, burst: 100 };
        let limiter = RateLimiter::new(rate_limit.rate, rate_limit.burst).unwrap();
        let config = InjectorConfig {
            timeout_secs: 5,
            verify_tls: false,
            proxy: None,
            follow_redirects: true,
            callback_base_url: "http://cb.example".to_string(),
        };
        Injector::new(store, limiter, config).unwrap()
    }

    fn get_request(url: &str) -> ParsedRequest {
        ParsedRequest {
            method: "GET".into(),
            url: url.into(),
            headers: vec![],
            body: None,
            host: "t.example".into(),
        }
    }

    #[tokio::test]
    async fn dry_run_records_injection_without_sending() {
        let injector = test_injector().await;
        let request = get_request("http://t.example/search?q=x");
        let vector = InjectionVector {
            location: VectorLocation::Query,
            name: "q".into(),
            original_value: "x".into(),
        };

        let result = injector
            .inject_vector(&request, &vector, "{{CALLBACK}}", None, true)
            .await
            .unwrap();

        assert_eq!(result.status, 0);
        assert!(result.success);
        assert_eq!(result.error.as_deref(), Some("[dry-run] Request not sent"));

        let stored = injector.store.get_injection(&result.correlation_id).await.unwrap();
        assert!(stored.is_some());
        assert!(stored.unwrap().target_url.contains("http://cb.example/"));
    }

    #[tokio::test]
    async fn injection_row_persists_even_when_template_has_no_placeholder() {
        let injector = test_injector().await;
        let request = get_request("http://t.example/search?q=x");
        let vector = InjectionVector {
            location: VectorLocation::Query,
            name: "q".into(),
            original_value: "x".into(),
        };

        let result = injector
            .inject_vector(&request, &vector, "' OR 1=1 --", Some("sqli:mssql".into()), true)
            .await
            .unwrap();

        let stored = injector
            .store
            .get_injection(&result.correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.payload, "' OR 1=1 --");
        assert_eq!(stored.context.as_deref(), Some("sqli:mssql"));
    }
}
