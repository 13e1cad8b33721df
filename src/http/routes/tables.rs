//! Table/collection listing endpoint
//!
//! Keeps its original wire shape: failures (including "not configured")
//! are reported as `{ "error": ... }` in a 200 body, not as an error
//! status.

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/tables
async fn tables(State(state): State<Arc<AppState>>) -> Json<Value> {
    match state.db.get_tables().await {
        Ok(tables) => Json(json!({ "tables": tables })),
        Err(err) => Json(json!({ "error": err.to_string() })),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/tables", get(tables))
}
