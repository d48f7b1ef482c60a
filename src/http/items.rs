// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Global inventory routes (primary store + backup buffer).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::inventory::{DeleteResponse, ListResponse, WriteResponse};
use crate::item::Item;
use super::error::ApiError;
use super::AppState;

fn parse_item_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::InvalidIdentifier(format!("invalid item id '{}'", raw)))
}

/// `GET /laboratories/items`
pub async fn list_items(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    Ok(Json(state.inventory.list_with_fallback().await?))
}

/// `POST /laboratories/items`
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Json<WriteResponse>, ApiError> {
    let Json(item) = payload?;
    Ok(Json(state.inventory.create_with_fallback(item).await?))
}

/// `PUT /laboratories/items/:id`
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Json<WriteResponse>, ApiError> {
    let id = parse_item_id(&id)?;
    let Json(item) = payload?;
    Ok(Json(state.inventory.update(id, item).await?))
}

/// `DELETE /laboratories/items/:id`
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_item_id(&id)?;
    Ok(Json(state.inventory.delete(id).await?))
}
