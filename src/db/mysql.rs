//! MySQL/MariaDB backend over a lazily-connecting sqlx pool
//!
//! MariaDB speaks the MySQL wire protocol, so both DB_TYPE values share
//! this implementation.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};

use super::backend::ItemBackend;
use super::error::DbResult;
use crate::config::DbConfig;
use crate::dblog::DbLog;
use crate::models::Item;

const DEFAULT_PORT: u16 = 3306;
const MAX_CONNECTIONS: u32 = 5;

pub struct MySqlBackend {
    pool: MySqlPool,
    /// Schema name for table listing; information_schema is filtered by it.
    schema: Option<String>,
}

impl MySqlBackend {
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
                "Connecting to MySQL/MariaDB host={} port={} database={} user={}",
                host,
                port,
                config.name.as_deref().unwrap_or("(none)"),
                config.user.as_deref().unwrap_or("(none)"),
            ),
            false,
        );

        let mut opts = MySqlConnectOptions::new().host(host).port(port);
        if let Some(name) = config.name.as_deref() {
            opts = opts.database(name);
        }
        if let Some(user) = config.user.as_deref() {
            opts = opts.username(user);
        }
        if let Some(password) = config.password.as_deref() {
            opts = opts.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy_with(opts);

        Self {
            pool,
            schema: config.name.clone(),
        }
    }

    fn item_from_row(row: &MySqlRow) -> DbResult<Item> {
        let id: i32 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        // DATETIME carries no zone; stored values are written by the server
        // default clock, read back as UTC.
        let created_at: Option<NaiveDateTime> = row.try_get("created_at")?;
        Ok(Item {
            id: id as i64,
            name,
            created_at: created_at.map(|t| t.and_utc()),
        })
    }
}

#[async_trait]
impl ItemBackend for MySqlBackend {
    async fn list_tables(&self) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT table_name AS name FROM information_schema.tables
            WHERE table_schema = ? AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .bind(self.schema.as_deref().unwrap_or_default())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| r.try_get("name").map_err(Into::into))
            .collect()
    }

    async fn ensure_items(&self) -> DbResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                created_at DATETIME(6) DEFAULT CURRENT_TIMESTAMP(6)
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
        let row = sqlx::query("SELECT id, name, created_at FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::item_from_row).transpose()
    }

    async fn create_item(&self, name: &str) -> DbResult<Item> {
        self.ensure_items().await?;
        let result = sqlx::query("INSERT INTO items (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        // No RETURNING on this family; read the row back by its assigned id.
        let row = sqlx::query("SELECT id, name, created_at FROM items WHERE id = ?")
            .bind(result.last_insert_id() as i64)
            .fetch_one(&self.pool)
            .await?;
        Self::item_from_row(&row)
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
