//! Diagnostic log endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::dblog::LogEntry;
use crate::state::AppState;

#[derive(Serialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// GET /api/logs - recent connection/health diagnostics, oldest first.
async fn logs(State(state): State<Arc<AppState>>) -> Json<LogsResponse> {
    Json(LogsResponse {
        logs: state.log.snapshot(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/logs", get(logs))
}
