// src/store/injections.rs

use super::Store;
use crate::error::{RicochetError, RicochetResult};
use crate::model::InjectionRecord;
use tracing::{debug, warn};

impl Store {
    /// Insert an injection record. Fails with `DuplicateId` if `id` already
    /// exists.
    pub async fn record_injection(&self, record: &InjectionRecord) -> RicochetResult<()> {
        let result = sqlx::query(
            "INSERT INTO injections (id, target_url, parameter, payload, context, injected_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&record.id)
        .bind(&record.target_url)
        .bind(&record.parameter)
        .bind(&record.payload)
        .bind(&record.context)
        .bind(record.injected_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(id = %record.id, "recorded injection");
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(id = %record.id, "duplicate injection id rejected");
                Err(RicochetError::DuplicateId(record.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch an injection by correlation ID.
    pub async fn get_injection(&self, id: &str) -> RicochetResult<Option<InjectionRecord>> {
        let row = sqlx::query_as::<_, InjectionRecord>(
            "SELECT id, target_url, parameter, payload, context, injected_at
             FROM injections WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List up to `limit` injection records, newest first.
    pub async fn list_injections(&self, limit: i64) -> RicochetResult<Vec<InjectionRecord>> {
        let rows = sqlx::query_as::<_, InjectionRecord>(
            "SELECT id, target_url, parameter, payload, context, injected_at
             FROM injections ORDER BY injected_at DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
