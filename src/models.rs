//! Canonical item entity shared by all backends

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single item, normalized from whatever row/document shape the active
/// backend stores. Exactly these three fields cross the facade; nothing
/// backend-specific (Mongo's `_id`, column metadata) leaks through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    /// Creation timestamp, `None` when the backend row predates the
    /// default-now column or the document simply lacks the field.
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}
