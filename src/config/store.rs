// src/config/store.rs
// Persistence configuration (6, External Interfaces: Persisted state).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `sqlite://<path>` connection string. Defaults to the per-user config
    /// directory joined with `ricochet.db`.
    pub database_url: String,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("RICOCHET_DATABASE_URL")
                .unwrap_or_else(|_| format!("sqlite://{}", default_db_path().display())),
            max_connections: super::helpers::env_parsed_or("RICOCHET_SQLITE_MAX_CONNECTIONS", 5),
        }
    }
}

/// Default database path: per-user config directory / ricochet.db.
pub fn default_db_path() -> PathBuf {
    let dir = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
    let dir = dir.join("ricochet");
    dir.join("ricochet.db")
}
