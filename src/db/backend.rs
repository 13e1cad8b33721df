//! The backend seam: one trait, three implementations
//!
//! The facade constructs exactly one implementation per process (chosen by
//! the resolver) and dispatches every logical operation through this trait.
//! Tests swap in a fake implementation the same way.

use async_trait::async_trait;

use super::error::DbResult;
use crate::models::Item;

/// Capability set shared by every backend family.
#[async_trait]
pub trait ItemBackend: Send + Sync {
    /// Base table / collection names in the configured schema or database,
    /// ordered lexicographically.
    async fn list_tables(&self) -> DbResult<Vec<String>>;

    /// Idempotent "create the items storage if absent". Cheap enough to run
    /// before every item read/write; must not fail when already present.
    async fn ensure_items(&self) -> DbResult<()>;

    /// All items, ascending by id.
    async fn list_items(&self) -> DbResult<Vec<Item>>;

    /// Single item lookup; absent is `Ok(None)`, not an error.
    async fn get_item(&self, id: i64) -> DbResult<Option<Item>>;

    /// Insert one item and return the fully materialized row, including the
    /// server-assigned id and creation timestamp.
    async fn create_item(&self, name: &str) -> DbResult<Item>;

    /// Cheapest possible liveness query.
    async fn ping(&self) -> DbResult<()>;
}
