//! MongoDB backend
//!
//! Unlike the relational pools, the driver client is verified with an
//! eager `ping` at construction; a handshake failure surfaces to the
//! caller instead of on the first query.

use async_trait::async_trait;
use chrono::DateTime;
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use super::backend::ItemBackend;
use super::error::DbResult;
use crate::config::DbConfig;
use crate::dblog::DbLog;
use crate::models::Item;

const DEFAULT_PORT: u16 = 27017;
const ITEMS_COLLECTION: &str = "items";

/// Item document shape. `_id` stays driver-internal; the logical `id` is a
/// plain integer field maintained by `create_item`.
#[derive(Debug, Serialize, Deserialize)]
struct ItemDoc {
    id: i64,
    name: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    created_at: Option<BsonDateTime>,
}

impl From<ItemDoc> for Item {
    fn from(doc: ItemDoc) -> Self {
        Item {
            id: doc.id,
            name: doc.name,
            created_at: doc
                .created_at
                .and_then(|t| DateTime::from_timestamp_millis(t.timestamp_millis())),
        }
    }
}

pub struct MongoBackend {
    db: mongodb::Database,
}

impl MongoBackend {
    /// Establish the client and verify the deployment is reachable.
    /// Called at most once per process by the facade.
    pub async fn connect(config: &DbConfig, log: &DbLog) -> DbResult<Self> {
        let options = if let Some(uri) = config.uri.as_deref() {
            log.append("Connecting to MongoDB via DB_URI", false);
            ClientOptions::parse(uri).await?
        } else {
            let host = config.host.as_deref().unwrap_or("localhost");
            let port = config
                .port
                .as_deref()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT);

            log.append(
                format!(
                    "Connecting to MongoDB host={} port={} database={} user={}",
                    host,
                    port,
                    config.name.as_deref().unwrap_or("(none)"),
                    if config.user.is_some() { "(set)" } else { "(none)" },
                ),
                false,
            );

            let mut options = ClientOptions::builder()
                .hosts(vec![ServerAddress::Tcp {
                    host: host.to_string(),
                    port: Some(port),
                }])
                .build();
            if let (Some(user), Some(password)) = (config.user.as_deref(), config.password.as_deref())
            {
                options.credential = Some(
                    Credential::builder()
                        .username(user.to_string())
                        .password(password.to_string())
                        .build(),
                );
            }
            options
        };

        let client = Client::with_options(options)?;
        let db = match config.name.as_deref() {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database("test")),
        };

        // Eager handshake; failure propagates to the caller.
        db.run_command(doc! { "ping": 1 }).await?;

        Ok(Self { db })
    }

    fn items(&self) -> Collection<ItemDoc> {
        self.db.collection(ITEMS_COLLECTION)
    }
}

#[async_trait]
impl ItemBackend for MongoBackend {
    async fn list_tables(&self) -> DbResult<Vec<String>> {
        let mut names = self.db.list_collection_names().await?;
        names.sort();
        Ok(names)
    }

    async fn ensure_items(&self) -> DbResult<()> {
        // Collections are created implicitly on first insert.
        Ok(())
    }

    async fn list_items(&self) -> DbResult<Vec<Item>> {
        let cursor = self.items().find(doc! {}).sort(doc! { "id": 1 }).await?;
        let docs: Vec<ItemDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Item::from).collect())
    }

    async fn get_item(&self, id: i64) -> DbResult<Option<Item>> {
        let doc = self.items().find_one(doc! { "id": id }).await?;
        Ok(doc.map(Item::from))
    }

    async fn create_item(&self, name: &str) -> DbResult<Item> {
        let col = self.items();
        // No native auto-increment: assign max+1. Read-then-write, so two
        // concurrent inserts can collide; accepted limitation (no unique
        // index, no retry-on-conflict).
        let last = col.find_one(doc! {}).sort(doc! { "id": -1 }).await?;
        let next_id = last.map(|d| d.id + 1).unwrap_or(1);

        let doc = ItemDoc {
            id: next_id,
            name: name.to_string(),
            created_at: Some(BsonDateTime::now()),
        };
        col.insert_one(&doc).await?;
        Ok(doc.into())
    }

    async fn ping(&self) -> DbResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
