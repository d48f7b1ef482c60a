// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Laboratory documents: labs, their items and item maintenance history.
//!
//! Plain CRUD over the [`DocumentStore`]. There is no backup-buffer fallback
//! here: a document-store failure is an error. Deleting a lab removes only
//! that document.

mod types;

pub use types::{
    InvalidLabId, LabId, LabItem, LabItemInput, Laboratory, MaintenanceRecord, NewLaboratory,
};

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::item::Item;
use crate::metrics;
use crate::storage::traits::{DocumentStore, StorageError, UpdateResult};

#[derive(Error, Debug)]
pub enum LabError {
    #[error(transparent)]
    InvalidId(#[from] InvalidLabId),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub const LAB_NOT_FOUND: &str = "laboratory not found";
pub const ITEM_NOT_FOUND: &str = "item not found";

fn require_match(result: UpdateResult, what: &'static str) -> Result<(), LabError> {
    if result.matched == 0 {
        Err(LabError::NotFound(what))
    } else {
        Ok(())
    }
}

fn record<T>(operation: &str, result: &Result<T, LabError>) {
    let status = match result {
        Ok(_) => "success",
        Err(LabError::InvalidId(_)) => "invalid_id",
        Err(LabError::NotFound(_)) => "not_found",
        Err(LabError::Storage(_)) => "error",
    };
    metrics::record_lab_operation(operation, status);
}

#[derive(Clone)]
pub struct LabService {
    documents: Arc<dyn DocumentStore>,
}

impl LabService {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    #[tracing::instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_lab(&self, payload: NewLaboratory) -> Result<Laboratory, LabError> {
        let lab = payload.into_laboratory(LabId::generate());
        let result = self.documents.insert_lab(&lab).await.map_err(LabError::from);
        record("create_lab", &result);
        result?;

        info!(lab_id = %lab.id, "Laboratory created");
        Ok(lab)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_labs(&self) -> Result<Vec<Laboratory>, LabError> {
        let result = self.documents.list_labs().await.map_err(LabError::from);
        record("list_labs", &result);
        result
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_lab(&self, lab_id: &str) -> Result<Laboratory, LabError> {
        let result = self.get_lab_inner(lab_id).await;
        record("get_lab", &result);
        result
    }

    async fn get_lab_inner(&self, lab_id: &str) -> Result<Laboratory, LabError> {
        let id = LabId::parse(lab_id)?;
        self.documents
            .find_lab(&id)
            .await?
            .ok_or(LabError::NotFound(LAB_NOT_FOUND))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_lab(&self, lab_id: &str) -> Result<(), LabError> {
        let result: Result<(), LabError> = async {
            let id = LabId::parse(lab_id)?;
            if self.documents.delete_lab(&id).await? == 0 {
                return Err(LabError::NotFound(LAB_NOT_FOUND));
            }
            info!(lab_id = %id, "Laboratory deleted");
            Ok(())
        }
        .await;
        record("delete_lab", &result);
        result
    }

    /// Add an item with a fresh id and an empty maintenance history.
    #[tracing::instrument(skip(self, input))]
    pub async fn add_item(&self, lab_id: &str, input: LabItemInput) -> Result<LabItem, LabError> {
        let result: Result<LabItem, LabError> = async {
            let id = LabId::parse(lab_id)?;
            let item = LabItem::new(input);
            require_match(self.documents.push_item(&id, &item).await?, LAB_NOT_FOUND)?;
            debug!(lab_id = %id, item_id = %item.id, "Item added to laboratory");
            Ok(item)
        }
        .await;
        record("add_item", &result);
        result
    }

    #[tracing::instrument(skip(self, item))]
    pub async fn update_item(&self, lab_id: &str, item_id: &str, item: Item) -> Result<(), LabError> {
        let result: Result<(), LabError> = async {
            let id = LabId::parse(lab_id)?;
            require_match(self.documents.update_item(&id, item_id, &item).await?, ITEM_NOT_FOUND)
        }
        .await;
        record("update_item", &result);
        result
    }

    /// Append a maintenance record to one item. Sibling items are untouched.
    #[tracing::instrument(skip(self, fields))]
    pub async fn add_maintenance(
        &self,
        lab_id: &str,
        item_id: &str,
        fields: Map<String, Value>,
    ) -> Result<MaintenanceRecord, LabError> {
        let result: Result<MaintenanceRecord, LabError> = async {
            let id = LabId::parse(lab_id)?;
            let entry = MaintenanceRecord::new(fields);
            require_match(
                self.documents.push_maintenance(&id, item_id, &entry).await?,
                ITEM_NOT_FOUND,
            )?;
            Ok(entry)
        }
        .await;
        record("add_maintenance", &result);
        result
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, lab_id: &str, item_id: &str) -> Result<(), LabError> {
        let result: Result<(), LabError> = async {
            let id = LabId::parse(lab_id)?;
            require_match(self.documents.pull_item(&id, item_id).await?, ITEM_NOT_FOUND)
        }
        .await;
        record("remove_item", &result);
        result
    }
}
