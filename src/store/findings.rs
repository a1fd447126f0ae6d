// src/store/findings.rs
// Join-based finding production (4.2): one Finding per injection/callback
// pair, filtered by recency and derived severity.

use super::Store;
use crate::error::RicochetResult;
use crate::model::{Finding, Severity};
use std::collections::BTreeMap;

/// Parameters for `Store::get_findings`. `since` and `min_severity` are both
/// optional; omitting either returns everything on that axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindingsQuery {
    /// Only findings whose callback was received strictly after this
    /// wall-clock timestamp.
    pub since: Option<f64>,
    /// Only findings at or above this severity. Severity is derived, not
    /// stored, so this filter is applied after the join.
    pub min_severity: Option<Severity>,
}

impl FindingsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since(mut self, since: f64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }
}

/// Raw join row. `sqlx::query_as` matches by column name, so both tables'
/// `id` columns are aliased to avoid colliding on the same result name.
#[derive(sqlx::FromRow)]
struct FindingRow {
    correlation_id: String,
    target_url: String,
    parameter: String,
    payload: String,
    context: Option<String>,
    injected_at: f64,
    callback_id: i64,
    source_ip: String,
    request_path: String,
    callback_headers_json: String,
    callback_body: Option<Vec<u8>>,
    received_at: f64,
}

impl Store {
    /// Every (injection, callback) pair sharing a correlation ID, most
    /// recently received first.
    pub async fn get_findings(&self, query: FindingsQuery) -> RicochetResult<Vec<Finding>> {
        let since = query.since.unwrap_or(f64::MIN);

        let rows: Vec<FindingRow> = sqlx::query_as(
            "SELECT
                i.id AS correlation_id, i.target_url, i.parameter, i.payload, i.context, i.injected_at,
                c.id AS callback_id, c.source_ip, c.request_path,
                c.headers AS callback_headers_json, c.body AS callback_body, c.received_at
             FROM callbacks c
             JOIN injections i ON i.id = c.correlation_id
             WHERE c.received_at > ?1
             ORDER BY c.received_at DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut findings = Vec::with_capacity(rows.len());
        for row in rows {
            let callback_headers: BTreeMap<String, String> =
                serde_json::from_str(&row.callback_headers_json)
                    .map_err(|e| crate::error::RicochetError::ParseError(e.to_string()))?;
            findings.push(Finding {
                correlation_id: row.correlation_id,
                target_url: row.target_url,
                parameter: row.parameter,
                payload: row.payload,
                context: row.context,
                injected_at: row.injected_at,
                callback_id: row.callback_id,
                source_ip: row.source_ip,
                request_path: row.request_path,
                callback_headers,
                callback_body: row.callback_body,
                received_at: row.received_at,
            });
        }

        if let Some(min_severity) = query.min_severity {
            findings.retain(|f| f.severity() >= min_severity);
        }

        Ok(findings)
    }
}
