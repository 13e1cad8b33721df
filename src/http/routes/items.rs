//! Item CRUD endpoints
//!
//! These routes sit behind the database gate middleware; by the time a
//! handler runs, the backend has answered a ping.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::models::Item;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// GET /api/items - all items, ascending by id
async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.db.list_items().await?;
    Ok(Json(items))
}

/// GET /api/items/{id}
async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, ApiError> {
    let item = state.db.get_item(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(item))
}

/// POST /api/items
async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    // Missing name is a 400, not a deserialization rejection.
    let name = req.name.as_deref().unwrap_or("");
    let item = state.db.create_item(name).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item))
}
