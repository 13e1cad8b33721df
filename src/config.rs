//! Environment configuration snapshot
//!
//! Read once at process start; everything downstream (backend resolution,
//! connection setup, the masked config endpoint) derives from the snapshot
//! and never re-reads the environment.

use std::collections::BTreeMap;
use std::env;

/// Process-wide configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// HTTP listen port: first of WAS_PORT, WEB_PORT, PORT; default 3000.
    pub port: u16,
    pub db: DbConfig,
}

/// Database-related environment keys, kept as raw strings so the resolver
/// can treat malformed values (non-numeric DB_PORT) as weak signals rather
/// than startup failures.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Explicit backend override (DB_TYPE), upper-cased at read time.
    pub db_type: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Full connection URI (DB_URI); denotes MongoDB when present.
    pub uri: Option<String>,
}

const MASKED_PASSWORD: &str = "********";
const UNSET: &str = "(unset)";

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = ["WAS_PORT", "WEB_PORT", "PORT"]
            .iter()
            .find_map(|k| env_opt(k))
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Self {
            port,
            db: DbConfig {
                db_type: env_opt("DB_TYPE").map(|v| v.to_uppercase()),
                host: env_opt("DB_HOST"),
                port: env_opt("DB_PORT"),
                name: env_opt("DB_NAME"),
                user: env_opt("DB_USER"),
                password: env_opt("DB_PASSWORD"),
                uri: env_opt("DB_URI"),
            },
        }
    }
}

impl DbConfig {
    /// Display view of the database environment with the password redacted.
    /// Served verbatim by `GET /api/config`.
    pub fn masked(&self) -> BTreeMap<&'static str, String> {
        let display = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .unwrap_or_else(|| UNSET.to_string())
        };
        let mut out = BTreeMap::new();
        out.insert("DB_TYPE", display(&self.db_type));
        out.insert("DB_HOST", display(&self.host));
        out.insert("DB_PORT", display(&self.port));
        out.insert("DB_NAME", display(&self.name));
        out.insert("DB_USER", display(&self.user));
        out.insert(
            "DB_PASSWORD",
            if self.password.as_deref().is_some_and(|p| !p.is_empty()) {
                MASKED_PASSWORD.to_string()
            } else {
                UNSET.to_string()
            },
        );
        out
    }
}
