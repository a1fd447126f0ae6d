// src/store/callbacks.rs

use super::Store;
use crate::error::RicochetResult;
use crate::model::CallbackRecord;
use std::collections::BTreeMap;
use tracing::{debug, warn};

impl Store {
    /// Record an inbound callback against `correlation_id`. Returns `true`
    /// and persists the row only if a matching injection exists; otherwise
    /// returns `false` and discards the callback silently (callers, i.e. the
    /// HTTP and DNS servers, still respond 200 OK either way). The
    /// existence check and insert run inside a single transaction so a
    /// concurrent deletion can't slip a row past the foreign key.
    pub async fn record_callback(
        &self,
        correlation_id: &str,
        source_ip: &str,
        request_path: &str,
        headers: &BTreeMap<String, String>,
        body: Option<&[u8]>,
        received_at: f64,
    ) -> RicochetResult<bool> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(String,)> =
            sqlx::query_as("SELECT id FROM injections WHERE id = ?1")
                .bind(correlation_id)
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_none() {
            tx.commit().await?;
            warn!(correlation_id, "callback for unknown correlation id discarded");
            return Ok(false);
        }

        let headers_json = serde_json::to_string(headers)
            .map_err(|e| crate::error::RicochetError::ParseError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO callbacks (correlation_id, source_ip, request_path, headers, body, received_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(correlation_id)
        .bind(source_ip)
        .bind(request_path)
        .bind(headers_json)
        .bind(body)
        .bind(received_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(correlation_id, "recorded callback");
        Ok(true)
    }

    /// Callbacks recorded against `correlation_id`, newest first.
    pub async fn get_callbacks_for_injection(
        &self,
        correlation_id: &str,
    ) -> RicochetResult<Vec<CallbackRecord>> {
        let rows: Vec<(i64, String, String, String, String, Option<Vec<u8>>, f64)> = sqlx::query_as(
            "SELECT id, correlation_id, source_ip, request_path, headers, body, received_at
             FROM callbacks WHERE correlation_id = ?1 ORDER BY received_at DESC",
        )
        .bind(correlation_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(
                |(id, correlation_id, source_ip, request_path, headers_json, body, received_at)| {
                    let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)
                        .map_err(|e| crate::error::RicochetError::ParseError(e.to_string()))?;
                    Ok(CallbackRecord {
                        id,
                        correlation_id,
                        source_ip,
                        request_path,
                        headers,
                        body,
                        received_at,
                    })
                },
            )
            .collect()
    }
}
