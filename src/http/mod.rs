// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! HTTP surface.
//!
//! ```text
//! GET    /health
//! GET    /laboratories/items                         list (fallback)
//! POST   /laboratories/items                         create (fallback)
//! PUT    /laboratories/items/:id                     update (primary only)
//! DELETE /laboratories/items/:id                     delete (primary only)
//! GET    /laboratories/                              list labs
//! POST   /laboratories/                              create lab (201)
//! GET    /laboratories/:lab_id                       get lab
//! DELETE /laboratories/:lab_id                       delete lab
//! PUT    /laboratories/:lab_id/add-item              add item to lab
//! PUT    /laboratories/:lab_id/items/:item_id        update lab item
//! DELETE /laboratories/:lab_id/items/:item_id        remove lab item
//! POST   /laboratories/:lab_id/items/:item_id/maintenance
//! ```
//!
//! The literal `items` segment takes precedence over `:lab_id`.

mod error;
mod items;
mod labs;

pub use error::ApiError;
pub use labs::{ItemAddedResponse, MaintenanceAddedResponse, MessageResponse};

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::inventory::InventoryService;
use crate::labs::LabService;

/// Shared handler state. Both services are cheap `Arc` clones.
#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
    pub labs: LabService,
}

impl AppState {
    pub fn new(inventory: InventoryService, labs: LabService) -> Self {
        Self { inventory, labs }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/laboratories/items", get(items::list_items).post(items::create_item))
        .route(
            "/laboratories/items/:id",
            put(items::update_item).delete(items::delete_item),
        )
        .route("/laboratories", get(labs::list_labs).post(labs::create_lab))
        .route("/laboratories/", get(labs::list_labs).post(labs::create_lab))
        .route("/laboratories/:lab_id", get(labs::get_lab).delete(labs::delete_lab))
        .route("/laboratories/:lab_id/add-item", put(labs::add_item))
        .route(
            "/laboratories/:lab_id/items/:item_id",
            put(labs::update_item).delete(labs::remove_item),
        )
        .route(
            "/laboratories/:lab_id/items/:item_id/maintenance",
            post(labs::add_maintenance),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
