//! Shared application state threaded through handlers

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::dblog::DbLog;

/// Everything a request handler needs: the config snapshot, the database
/// facade, and the diagnostic log. Built once at startup, shared as
/// `Arc<AppState>`.
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub log: Arc<DbLog>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let log = Arc::new(DbLog::new());
        let db = Database::new(config.db.clone(), log.clone());
        Self { config, db, log }
    }

    /// Assemble from parts; used by tests to inject a fake-backed facade.
    pub fn from_parts(config: AppConfig, db: Database, log: Arc<DbLog>) -> Self {
        Self { config, db, log }
    }
}
