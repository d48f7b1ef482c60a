use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::item::{Item, StoredItem};
use crate::labs::{LabId, LabItem, Laboratory, MaintenanceRecord};
use super::traits::{BackupBuffer, DocumentStore, PrimaryStore, StorageError, UpdateResult};

/// Primary store held in process memory. Ids are assigned from 1 upward.
pub struct InMemoryPrimaryStore {
    rows: DashMap<i64, StoredItem>,
    next_id: AtomicI64,
}

impl InMemoryPrimaryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for InMemoryPrimaryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrimaryStore for InMemoryPrimaryStore {
    async fn list(&self) -> Result<Vec<StoredItem>, StorageError> {
        let mut rows: Vec<StoredItem> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn create(&self, item: &Item) -> Result<StoredItem, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let row = StoredItem::from_item(id, item);
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, item: &Item) -> Result<StoredItem, StorageError> {
        let mut entry = self.rows.get_mut(&id).ok_or(StorageError::NotFound)?;
        *entry = StoredItem::from_item(id, item);
        Ok(entry.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.rows.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

/// Backup buffer held in process memory. Newest entry first, like LPUSH.
#[derive(Default)]
pub struct InMemoryBackupBuffer {
    entries: Mutex<VecDeque<String>>,
}

impl InMemoryBackupBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry (the external "cache cleared" event).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[async_trait]
impl BackupBuffer for InMemoryBackupBuffer {
    async fn push(&self, entry: &str) -> Result<(), StorageError> {
        self.entries.lock().push_front(entry.to_string());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.lock().iter().cloned().collect())
    }
}

/// Laboratory documents held in process memory.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    labs: DashMap<LabId, Laboratory>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labs.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_lab(&self, lab: &Laboratory) -> Result<(), StorageError> {
        if self.labs.contains_key(&lab.id) {
            return Err(StorageError::Constraint(format!("duplicate laboratory id {}", lab.id)));
        }
        self.labs.insert(lab.id.clone(), lab.clone());
        Ok(())
    }

    async fn find_lab(&self, id: &LabId) -> Result<Option<Laboratory>, StorageError> {
        Ok(self.labs.get(id).map(|r| r.value().clone()))
    }

    async fn list_labs(&self) -> Result<Vec<Laboratory>, StorageError> {
        let mut labs: Vec<Laboratory> = self.labs.iter().map(|r| r.value().clone()).collect();
        labs.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(labs)
    }

    async fn delete_lab(&self, id: &LabId) -> Result<u64, StorageError> {
        Ok(u64::from(self.labs.remove(id).is_some()))
    }

    async fn push_item(&self, lab_id: &LabId, item: &LabItem) -> Result<UpdateResult, StorageError> {
        match self.labs.get_mut(lab_id) {
            Some(mut lab) => {
                lab.items.push(item.clone());
                Ok(UpdateResult::ONE)
            }
            None => Ok(UpdateResult::NONE),
        }
    }

    async fn update_item(&self, lab_id: &LabId, item_id: &str, item: &Item) -> Result<UpdateResult, StorageError> {
        let Some(mut lab) = self.labs.get_mut(lab_id) else {
            return Ok(UpdateResult::NONE);
        };
        match lab.item_mut(item_id) {
            Some(target) => {
                let before = target.clone();
                target.apply(item);
                Ok(UpdateResult { matched: 1, modified: u64::from(*target != before) })
            }
            None => Ok(UpdateResult::NONE),
        }
    }

    async fn push_maintenance(
        &self,
        lab_id: &LabId,
        item_id: &str,
        record: &MaintenanceRecord,
    ) -> Result<UpdateResult, StorageError> {
        let Some(mut lab) = self.labs.get_mut(lab_id) else {
            return Ok(UpdateResult::NONE);
        };
        match lab.item_mut(item_id) {
            Some(target) => {
                target.maintenance_history.push(record.clone());
                Ok(UpdateResult::ONE)
            }
            None => Ok(UpdateResult::NONE),
        }
    }

    async fn pull_item(&self, lab_id: &LabId, item_id: &str) -> Result<UpdateResult, StorageError> {
        let Some(mut lab) = self.labs.get_mut(lab_id) else {
            return Ok(UpdateResult::NONE);
        };
        match lab.items.iter().position(|i| i.id == item_id) {
            Some(pos) => {
                lab.items.remove(pos);
                Ok(UpdateResult::ONE)
            }
            None => Ok(UpdateResult::NONE),
        }
    }
}
