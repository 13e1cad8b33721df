//! HTTP surface: router assembly and the database gate

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Gate in front of the item routes: reject with 503 before the handler
/// runs when the database is unconfigured or fails its liveness ping.
async fn require_database(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.db.is_configured() || !state.db.ping().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "database is unavailable" })),
        )
            .into_response();
    }
    next.run(request).await
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let gated_items = routes::items::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_database,
    ));

    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::config::router())
        .merge(routes::tables::router())
        .merge(routes::logs::router())
        .merge(gated_items);

    // The API is consumed by a browser console served elsewhere; keep CORS
    // permissive like the original deployment.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
