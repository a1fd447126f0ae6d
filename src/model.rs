// src/model.rs
// Core data model: InjectionRecord, CallbackRecord, Finding, Severity.
//
// See the data model section for field semantics and invariants. None of
// these types are ever partially mutated in place once constructed; the
// store is the only thing that changes their durable representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the `injections` table. Created by the injector before
/// transmission; never mutated; destroyed only by administrative reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InjectionRecord {
    /// Correlation ID, primary key.
    pub id: String,
    /// Full URL after parameter mutation.
    pub target_url: String,
    /// Location-qualified name, e.g. `query:q` or `header:Referer`.
    pub parameter: String,
    /// Final substituted payload (correlation-derived callback URL visible).
    pub payload: String,
    /// Optional free-form tag naming vulnerability class, used for severity.
    pub context: Option<String>,
    /// Wall-clock seconds since epoch, fractional.
    pub injected_at: f64,
}

/// One row of the `callbacks` table. Inserted only if `correlation_id`
/// refers to an existing `InjectionRecord` — unknown IDs are silently
/// discarded at the persistence layer (see `Store::record_callback`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRecord {
    pub id: i64,
    pub correlation_id: String,
    pub source_ip: String,
    /// HTTP path, or `DNS:<qname>` for DNS-sourced callbacks.
    pub request_path: String,
    /// Header name -> value. For DNS this is synthesized as
    /// `{"qtype": "<n>"}`.
    pub headers: BTreeMap<String, String>,
    /// Opaque body bytes, normalized on bytes end-to-end (never decoded to
    /// text at the persistence layer).
    pub body: Option<Vec<u8>>,
    pub received_at: f64,
}

/// Severity derived from an injection's `context` tag. Ordering:
/// `info=0 < low=1 < medium=2 < high=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Parse a severity label, defaulting to `Info` for anything unknown
    /// (matching the store's `InvalidSeverity` recovery rule).
    pub fn parse_or_info(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Info,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A materialized join view: one Finding per (InjectionRecord,
/// CallbackRecord) pair sharing a correlation ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub correlation_id: String,
    pub target_url: String,
    pub parameter: String,
    pub payload: String,
    pub context: Option<String>,
    pub injected_at: f64,
    pub callback_id: i64,
    pub source_ip: String,
    pub request_path: String,
    pub callback_headers: BTreeMap<String, String>,
    pub callback_body: Option<Vec<u8>>,
    pub received_at: f64,
}

impl Finding {
    /// `received_at - injected_at`. Not guaranteed positive: clock skew
    /// between the injecting process and the callback server is possible.
    pub fn delay_seconds(&self) -> f64 {
        self.received_at - self.injected_at
    }

    /// Severity derived from `context` by case-insensitive substring match.
    /// Precedence when multiple classes match: `ssti > sqli > xss > other`.
    pub fn severity(&self) -> Severity {
        let Some(context) = &self.context else {
            return Severity::Info;
        };
        let lower = context.to_ascii_lowercase();
        if lower.contains("ssti") {
            Severity::High
        } else if lower.contains("sqli") {
            Severity::High
        } else if lower.contains("xss") {
            Severity::Medium
        } else {
            Severity::Info
        }
    }

    /// If the callback body is present and parses as a JSON object, expose
    /// it. XSS exfiltration payloads typically POST a JSON blob with
    /// captured `url`/`cookies`/`dom`/`ua` fields.
    pub fn metadata(&self) -> Option<serde_json::Value> {
        let body = self.callback_body.as_ref()?;
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        value.is_object().then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding_with_context(context: Option<&str>) -> Finding {
        Finding {
            correlation_id: "a1b2c3d4e5f60718".into(),
            target_url: "http://t.example/search?q=x".into(),
            parameter: "query:q".into(),
            payload: "x".into(),
            context: context.map(str::to_string),
            injected_at: 100.0,
            callback_id: 1,
            source_ip: "203.0.113.7".into(),
            request_path: "/a1b2c3d4e5f60718".into(),
            callback_headers: BTreeMap::new(),
            callback_body: None,
            received_at: 105.0,
        }
    }

    #[test]
    fn severity_defaults_to_info() {
        assert_eq!(finding_with_context(None).severity(), Severity::Info);
        assert_eq!(finding_with_context(Some("stored")).severity(), Severity::Info);
    }

    #[test]
    fn severity_maps_sqli_and_ssti_to_high() {
        assert_eq!(finding_with_context(Some("sqli:mssql")).severity(), Severity::High);
        assert_eq!(finding_with_context(Some("SSTI:jinja2")).severity(), Severity::High);
    }

    #[test]
    fn severity_maps_xss_to_medium() {
        assert_eq!(finding_with_context(Some("xss:stored")).severity(), Severity::Medium);
    }

    #[test]
    fn delay_seconds_may_be_negative() {
        let mut f = finding_with_context(None);
        f.injected_at = 200.0;
        f.received_at = 100.0;
        assert!(f.delay_seconds() < 0.0);
    }

    #[test]
    fn metadata_parses_json_object_body() {
        let mut f = finding_with_context(None);
        f.callback_body = Some(br#"{"cookies":"sid=1"}"#.to_vec());
        assert!(f.metadata().is_some());
    }

    #[test]
    fn metadata_none_for_non_json_body() {
        let mut f = finding_with_context(None);
        f.callback_body = Some(b"not json".to_vec());
        assert!(f.metadata().is_none());
    }
}
