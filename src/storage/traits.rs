use async_trait::async_trait;
use thiserror::Error;

use crate::item::{Item, StoredItem};
use crate::labs::{LabId, LabItem, Laboratory, MaintenanceRecord};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Item not found")]
    NotFound,
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Match/modify counts of a targeted document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents (or array elements) that matched the filter
    pub matched: u64,
    /// Documents actually changed
    pub modified: u64,
}

impl UpdateResult {
    pub const NONE: Self = Self { matched: 0, modified: 0 };
    pub const ONE: Self = Self { matched: 1, modified: 1 };
}

/// The relational store of record for global items.
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<StoredItem>, StorageError>;
    async fn create(&self, item: &Item) -> Result<StoredItem, StorageError>;

    /// Fails with [`StorageError::NotFound`] when no row has `id`.
    async fn update(&self, id: i64, item: &Item) -> Result<StoredItem, StorageError>;

    /// Fails with [`StorageError::NotFound`] when no row has `id`.
    async fn delete(&self, id: i64) -> Result<(), StorageError>;
}

/// Cache-resident list of serialized items written while the primary store is down.
///
/// Entries are pushed to the head and read back in full. Reads never remove.
#[async_trait]
pub trait BackupBuffer: Send + Sync {
    async fn push(&self, entry: &str) -> Result<(), StorageError>;
    async fn read_all(&self) -> Result<Vec<String>, StorageError>;
}

/// Laboratory document collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_lab(&self, lab: &Laboratory) -> Result<(), StorageError>;
    async fn find_lab(&self, id: &LabId) -> Result<Option<Laboratory>, StorageError>;
    async fn list_labs(&self) -> Result<Vec<Laboratory>, StorageError>;

    /// Returns the number of documents deleted (0 or 1).
    async fn delete_lab(&self, id: &LabId) -> Result<u64, StorageError>;

    /// Append to the lab's `items` array.
    async fn push_item(&self, lab_id: &LabId, item: &LabItem) -> Result<UpdateResult, StorageError>;

    /// Overwrite the descriptive fields of the item matching `item_id`.
    async fn update_item(&self, lab_id: &LabId, item_id: &str, item: &Item) -> Result<UpdateResult, StorageError>;

    /// Append to the matched item's `maintenance_history`.
    async fn push_maintenance(
        &self,
        lab_id: &LabId,
        item_id: &str,
        record: &MaintenanceRecord,
    ) -> Result<UpdateResult, StorageError>;

    /// Remove the item matching `item_id` from `items`.
    async fn pull_item(&self, lab_id: &LabId, item_id: &str) -> Result<UpdateResult, StorageError>;
}
