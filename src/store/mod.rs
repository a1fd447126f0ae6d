// src/store/mod.rs
// Durable, transactional persistence for injections, callbacks, and
// join-based findings (4.2).

mod callbacks;
mod findings;
mod injections;

use crate::error::RicochetResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub use self::findings::FindingsQuery;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS injections (
    id TEXT PRIMARY KEY,
    target_url TEXT NOT NULL,
    parameter TEXT NOT NULL,
    payload TEXT NOT NULL,
    context TEXT,
    injected_at REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS callbacks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    correlation_id TEXT NOT NULL,
    source_ip TEXT NOT NULL,
    request_path TEXT NOT NULL,
    headers TEXT NOT NULL,
    body BLOB,
    received_at REAL NOT NULL,
    FOREIGN KEY (correlation_id) REFERENCES injections(id)
);

CREATE INDEX IF NOT EXISTS idx_callbacks_correlation ON callbacks(correlation_id);
CREATE INDEX IF NOT EXISTS idx_injections_injected_at ON injections(injected_at);
"#;

/// Process-local, persistent SQLite-backed store. Opens a pooled connection
/// per operation; the pool preserves FK enforcement and snapshot semantics
/// across every connection it hands out.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if absent) the store at `database_url`, a
    /// `sqlite://...` connection string, or a bare filesystem path.
    pub async fn open(database_url: &str, max_connections: u32) -> RicochetResult<Self> {
        let options = if let Some(path) = database_url.strip_prefix("sqlite://") {
            connect_options(Path::new(path))
        } else {
            SqliteConnectOptions::from_str(database_url)
                .map_err(|e| crate::error::RicochetError::StorageError(e.to_string()))?
                .create_if_missing(true)
                .foreign_keys(true)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an in-memory store, primarily for tests.
    pub async fn open_in_memory() -> RicochetResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| crate::error::RicochetError::StorageError(e.to_string()))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> RicochetResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        info!("store schema ready");
        Ok(())
    }
}

fn connect_options(path: &Path) -> SqliteConnectOptions {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
}
