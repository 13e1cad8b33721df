//! Database layer: backend resolution and the data access facade
//!
//! The HTTP layer talks to [`Database`] only. The facade resolves which
//! backend family is configured (once, syntactically, from the environment
//! snapshot), lazily constructs the matching [`ItemBackend`] implementation,
//! and wraps every driver failure into the closed [`DbError`] kinds.

pub mod backend;
pub mod error;
mod mongo;
mod mysql;
mod postgres;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;

pub use backend::ItemBackend;
pub use error::{DbError, DbResult};

use crate::config::DbConfig;
use crate::dblog::DbLog;
use crate::models::Item;
use mongo::MongoBackend;
use mysql::MySqlBackend;
use postgres::PostgresBackend;

/// The closed set of supported backend identifiers. MariaDB is its own
/// identifier but shares the MySQL family implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Postgres,
    MySql,
    MariaDb,
    MongoDb,
}

impl BackendType {
    /// Parse an explicit DB_TYPE value, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "POSTGRESQL" => Some(Self::Postgres),
            "MYSQL" => Some(Self::MySql),
            "MARIADB" => Some(Self::MariaDb),
            "MONGODB" => Some(Self::MongoDb),
            _ => None,
        }
    }

    /// Map well-known ports to their backend.
    pub fn from_port(port: u16) -> Option<Self> {
        match port {
            5432 => Some(Self::Postgres),
            3306 => Some(Self::MySql),
            27017 => Some(Self::MongoDb),
            _ => None,
        }
    }

    /// Human-readable family name for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Postgres => "PostgreSQL",
            Self::MySql | Self::MariaDb => "MySQL/MariaDB",
            Self::MongoDb => "MongoDB",
        }
    }
}

/// Derive the backend family from the configuration snapshot.
///
/// First match wins: explicit DB_TYPE, then a non-blank DB_URI (always
/// MongoDB), then well-known DB_PORT values. Purely syntactic; an invalid
/// explicit type falls through to the weaker signals.
pub fn resolve(config: &DbConfig) -> Option<BackendType> {
    if let Some(ty) = config.db_type.as_deref().and_then(BackendType::from_name) {
        return Some(ty);
    }
    if config.uri.as_deref().is_some_and(|u| !u.trim().is_empty()) {
        return Some(BackendType::MongoDb);
    }
    let port: u16 = config.port.as_deref()?.trim().parse().ok()?;
    BackendType::from_port(port)
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Whether enough configuration is present to attempt a connection.
pub fn is_configured(config: &DbConfig) -> bool {
    let Some(ty) = resolve(config) else {
        return false;
    };
    let host_and_name = non_empty(&config.host) && non_empty(&config.name);
    match ty {
        BackendType::MongoDb => non_empty(&config.uri) || host_and_name,
        _ => host_and_name,
    }
}

/// Single entry point for all database access.
///
/// Owns the configuration snapshot, the memoized backend handle, the
/// diagnostic log, and the first-ping-success flag. Constructed once at
/// startup and shared through `AppState`.
pub struct Database {
    config: DbConfig,
    backend: OnceCell<Arc<dyn ItemBackend>>,
    log: Arc<DbLog>,
    ping_ok_logged: AtomicBool,
}

impl Database {
    pub fn new(config: DbConfig, log: Arc<DbLog>) -> Self {
        Self {
            config,
            backend: OnceCell::new(),
            log,
            ping_ok_logged: AtomicBool::new(false),
        }
    }

    /// Construct with a pre-built backend, bypassing lazy construction.
    /// This is the seam for driving the facade (and the HTTP layer above
    /// it) with an in-memory backend in tests.
    pub fn with_backend(
        config: DbConfig,
        backend: Arc<dyn ItemBackend>,
        log: Arc<DbLog>,
    ) -> Self {
        Self {
            config,
            backend: OnceCell::new_with(Some(backend)),
            log,
            ping_ok_logged: AtomicBool::new(false),
        }
    }

    pub fn backend_type(&self) -> Option<BackendType> {
        resolve(&self.config)
    }

    pub fn is_configured(&self) -> bool {
        is_configured(&self.config)
    }

    /// Resolve and memoize the backend handle. The cell serializes
    /// concurrent first calls, so each family connects at most once per
    /// process; relational pools are lazy, Mongo handshakes eagerly and
    /// its failure propagates (and is retried on the next call, since a
    /// failed init leaves the cell empty).
    async fn backend(&self) -> DbResult<&Arc<dyn ItemBackend>> {
        if !self.is_configured() {
            return Err(DbError::NotConfigured);
        }
        let ty = self.backend_type().ok_or(DbError::NotConfigured)?;
        self.backend
            .get_or_try_init(|| async move {
                let backend: Arc<dyn ItemBackend> = match ty {
                    BackendType::Postgres => {
                        Arc::new(PostgresBackend::connect(&self.config, &self.log))
                    }
                    BackendType::MySql | BackendType::MariaDb => {
                        Arc::new(MySqlBackend::connect(&self.config, &self.log))
                    }
                    BackendType::MongoDb => {
                        Arc::new(MongoBackend::connect(&self.config, &self.log).await?)
                    }
                };
                Ok(backend)
            })
            .await
    }

    /// Base table / collection names, lexicographically ordered.
    pub async fn get_tables(&self) -> DbResult<Vec<String>> {
        self.backend().await?.list_tables().await
    }

    /// All items, ascending by id.
    pub async fn list_items(&self) -> DbResult<Vec<Item>> {
        self.backend().await?.list_items().await
    }

    /// Single item; absent is `Ok(None)`.
    pub async fn get_item(&self, id: i64) -> DbResult<Option<Item>> {
        self.backend().await?.get_item(id).await
    }

    /// Validate and insert; returns the materialized item.
    pub async fn create_item(&self, name: &str) -> DbResult<Item> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DbError::Validation {
                reason: "name is required",
            });
        }
        self.backend().await?.create_item(name).await
    }

    /// Liveness probe; never errors. Logs the first success once per
    /// process and every failure with error severity.
    pub async fn ping(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        let result = match self.backend().await {
            Ok(backend) => backend.ping().await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                if !self.ping_ok_logged.swap(true, Ordering::Relaxed) {
                    let label = self.backend_type().map(|t| t.label()).unwrap_or("unknown");
                    self.log.append(format!("Ping OK ({label})"), false);
                }
                true
            }
            Err(err) => {
                self.log.append(format!("Ping failed: {err}"), true);
                false
            }
        }
    }
}
