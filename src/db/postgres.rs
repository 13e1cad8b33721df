//! PostgreSQL backend over a lazily-connecting sqlx pool

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use super::backend::ItemBackend;
use super::error::DbResult;
use crate::config::DbConfig;
use crate::dblog::DbLog;
use crate::models::Item;

const DEFAULT_PORT: u16 = 5432;
const MAX_CONNECTIONS: u32 = 5;

pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Build the pool without touching the network; sqlx connects on the
    /// first query. Called at most once per process by the facade.
    pub fn connect(config: &DbConfig, log: &DbLog) -> Self {
        let host = config.host.as_deref().unwrap_or("localhost");
        let port = config
            .port
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        log.append(
            format!(
                "Connecting to PostgreSQL host={} port={} database={} user={}",
                host,
                port,
                config.name.as_deref().unwrap_or("(none)"),
                config.user.as_deref().unwrap_or("(none)"),
            ),
            false,
        );

        let mut opts = PgConnectOptions::new().host(host).port(port);
        if let Some(name) = config.name.as_deref() {
            opts = opts.database(name);
        }
        if let Some(user) = config.user.as_deref() {
            opts = opts.username(user);
        }
        if let Some(password) = config.password.as_deref() {
            opts = opts.password(password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy_with(opts);

        Self { pool }
    }

    fn item_from_row(row: &PgRow) -> DbResult<Item> {
        let id: i32 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let created_at: Option<DateTime<Utc>> = row.try_get("created_at")?;
        Ok(Item {
            id: id as i64,
            name,
            created_at,
        })
    }
}

#[async_trait]
impl ItemBackend for PostgresBackend {
    async fn list_tables(&self) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT table_name FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| r.try_get("table_name").map_err(Into::into))
            .collect()
    }

    async fn ensure_items(&self) -> DbResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_items(&self) -> DbResult<Vec<Item>> {
        self.ensure_items().await?;
        let rows = sqlx::query("SELECT id, name, created_at FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::item_from_row).collect()
    }

    async fn get_item(&self, id: i64) -> DbResult<Option<Item>> {
        self.ensure_items().await?;
        let row = sqlx::query("SELECT id, name, created_at FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::item_from_row).transpose()
    }

    async fn create_item(&self, name: &str) -> DbResult<Item> {
        self.ensure_items().await?;
        let row = sqlx::query("INSERT INTO items (name) VALUES ($1) RETURNING id, name, created_at")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Self::item_from_row(&row)
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
