// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Laboratory document routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::item::Item;
use crate::labs::{LabItem, LabItemInput, Laboratory, MaintenanceRecord, NewLaboratory};
use super::error::ApiError;
use super::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ItemAddedResponse {
    pub message: &'static str,
    pub item: LabItem,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceAddedResponse {
    pub message: &'static str,
    pub record: MaintenanceRecord,
}

/// `GET /laboratories/`
pub async fn list_labs(State(state): State<AppState>) -> Result<Json<Vec<Laboratory>>, ApiError> {
    Ok(Json(state.labs.list_labs().await?))
}

/// `POST /laboratories/`
pub async fn create_lab(
    State(state): State<AppState>,
    payload: Result<Json<NewLaboratory>, JsonRejection>,
) -> Result<(StatusCode, Json<Laboratory>), ApiError> {
    let Json(payload) = payload?;
    let lab = state.labs.create_lab(payload).await?;
    Ok((StatusCode::CREATED, Json(lab)))
}

/// `GET /laboratories/:lab_id`
pub async fn get_lab(
    State(state): State<AppState>,
    Path(lab_id): Path<String>,
) -> Result<Json<Laboratory>, ApiError> {
    Ok(Json(state.labs.get_lab(&lab_id).await?))
}

/// `DELETE /laboratories/:lab_id`
pub async fn delete_lab(
    State(state): State<AppState>,
    Path(lab_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.labs.delete_lab(&lab_id).await?;
    Ok(Json(MessageResponse { message: "laboratory deleted" }))
}

/// `PUT /laboratories/:lab_id/add-item`
pub async fn add_item(
    State(state): State<AppState>,
    Path(lab_id): Path<String>,
    payload: Result<Json<LabItemInput>, JsonRejection>,
) -> Result<Json<ItemAddedResponse>, ApiError> {
    let Json(input) = payload?;
    let item = state.labs.add_item(&lab_id, input).await?;
    Ok(Json(ItemAddedResponse { message: "item added to laboratory", item }))
}

/// `PUT /laboratories/:lab_id/items/:item_id`
pub async fn update_item(
    State(state): State<AppState>,
    Path((lab_id, item_id)): Path<(String, String)>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(item) = payload?;
    state.labs.update_item(&lab_id, &item_id, item).await?;
    Ok(Json(MessageResponse { message: "item updated" }))
}

/// `POST /laboratories/:lab_id/items/:item_id/maintenance`
pub async fn add_maintenance(
    State(state): State<AppState>,
    Path((lab_id, item_id)): Path<(String, String)>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<MaintenanceAddedResponse>, ApiError> {
    let Json(fields) = payload?;
    let record = state.labs.add_maintenance(&lab_id, &item_id, fields).await?;
    Ok(Json(MaintenanceAddedResponse { message: "maintenance recorded", record }))
}

/// `DELETE /laboratories/:lab_id/items/:item_id`
pub async fn remove_item(
    State(state): State<AppState>,
    Path((lab_id, item_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.labs.remove_item(&lab_id, &item_id).await?;
    Ok(Json(MessageResponse { message: "item removed" }))
}
