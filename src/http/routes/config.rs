//! Masked environment snapshot endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/config - database environment with the password redacted.
async fn config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "env": state.config.db.masked() }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/config", get(config))
}
