// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Read and create paths with backup-buffer failover.

use tracing::{debug, warn};

use crate::item::Item;
use crate::metrics;
use crate::storage::traits::StorageError;
use super::types::{ListResponse, Source, WriteResponse, WriteStatus, MSG_BUFFERED};
use super::InventoryService;

impl InventoryService {
    /// List all items, falling back to the backup buffer if the primary fails.
    ///
    /// Any primary error triggers the fallback. The buffer is read in full and
    /// left as is. Entries that don't parse are skipped.
    ///
    /// Fails only if the buffer itself can't be read.
    #[tracing::instrument(skip(self))]
    pub async fn list_with_fallback(&self) -> Result<ListResponse, StorageError> {
        let _timer = metrics::LatencyTimer::new("list");

        let primary_err = match self.primary.list().await {
            Ok(rows) => {
                debug!(count = rows.len(), "Listed items from primary store");
                metrics::record_request("list", Source::Primary.as_str());
                return Ok(ListResponse::primary(rows));
            }
            Err(e) => e,
        };

        warn!(error = %primary_err, "Primary store list failed, reading backup buffer");
        metrics::record_fallback("list");

        let raw = self.backup.read_all().await.map_err(|e| {
            metrics::record_error("list", "backup_read");
            e
        })?;
        metrics::set_backup_entries(raw.len());

        if raw.is_empty() {
            metrics::record_request("list", Source::BackupEmpty.as_str());
            return Ok(ListResponse::backup_empty());
        }

        let items: Vec<Item> = raw
            .iter()
            .filter_map(|entry| match Item::from_backup_entry(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable backup entry");
                    None
                }
            })
            .collect();

        metrics::record_request("list", Source::Backup.as_str());
        Ok(ListResponse::backup(items))
    }

    /// Create an item, buffering it if the primary store rejects the write.
    ///
    /// A buffered write returns `status: degraded` / `source: BACKUP`; callers
    /// have to read those fields to notice. Fails only if both stores fail.
    #[tracing::instrument(skip(self, item), fields(code = %item.code))]
    pub async fn create_with_fallback(&self, item: Item) -> Result<WriteResponse, StorageError> {
        let _timer = metrics::LatencyTimer::new("create");

        let primary_err = match self.primary.create(&item).await {
            Ok(row) => {
                debug!(id = row.id, "Item created in primary store");
                metrics::record_request("create", Source::Primary.as_str());
                return Ok(WriteResponse {
                    source: Source::Primary,
                    status: WriteStatus::Success,
                    message: None,
                    data: item,
                });
            }
            Err(e) => e,
        };

        warn!(error = %primary_err, "Primary store create failed, buffering item");
        metrics::record_fallback("create");

        let entry = item.to_backup_entry()?;
        self.backup.push(&entry).await.map_err(|e| {
            metrics::record_error("create", "backup_push");
            e
        })?;
        metrics::record_backup_push();
        metrics::record_request("create", Source::Backup.as_str());

        Ok(WriteResponse {
            source: Source::Backup,
            status: WriteStatus::Degraded,
            message: Some(MSG_BUFFERED),
            data: item,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use async_trait::async_trait;

    use crate::inventory::ListedItems;
    use crate::item::StoredItem;
    use crate::storage::memory::{InMemoryBackupBuffer, InMemoryPrimaryStore};
    use crate::storage::traits::{BackupBuffer, PrimaryStore};

    /// Primary store that can be switched off.
    struct SwitchablePrimary {
        inner: InMemoryPrimaryStore,
        down: AtomicBool,
    }

    impl SwitchablePrimary {
        fn new() -> Self {
            Self { inner: InMemoryPrimaryStore::new(), down: AtomicBool::new(false) }
        }

        fn check(&self) -> Result<(), StorageError> {
            if self.down.load(Ordering::SeqCst) {
                Err(StorageError::Unavailable("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl PrimaryStore for SwitchablePrimary {
        async fn list(&self) -> Result<Vec<StoredItem>, StorageError> {
            self.check()?;
            self.inner.list().await
        }
        async fn create(&self, item: &Item) -> Result<StoredItem, StorageError> {
            self.check()?;
            self.inner.create(item).await
        }
        async fn update(&self, id: i64, item: &Item) -> Result<StoredItem, StorageError> {
            self.check()?;
            self.inner.update(id, item).await
        }
        async fn delete(&self, id: i64) -> Result<(), StorageError> {
            self.check()?;
            self.inner.delete(id).await
        }
    }

    struct BrokenBuffer;

    #[async_trait]
    impl BackupBuffer for BrokenBuffer {
        async fn push(&self, _entry: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("redis down".into()))
        }
        async fn read_all(&self) -> Result<Vec<String>, StorageError> {
            Err(StorageError::Unavailable("redis down".into()))
        }
    }

    fn setup() -> (InventoryService, Arc<SwitchablePrimary>, Arc<InMemoryBackupBuffer>) {
        let primary = Arc::new(SwitchablePrimary::new());
        let backup = Arc::new(InMemoryBackupBuffer::new());
        (InventoryService::new(primary.clone(), backup.clone()), primary, backup)
    }

    fn test_item(code: &str) -> Item {
        Item::new(code, "Computer", "Operational", "Lab A")
    }

    #[tokio::test]
    async fn test_list_from_primary() {
        let (service, _, _) = setup();
        service.create_with_fallback(test_item("a")).await.unwrap();

        let response = service.list_with_fallback().await.unwrap();
        assert_eq!(response.source, Source::Primary);
        assert!(response.message.is_none());
        assert_eq!(response.data.len(), 1);
    }

    #[tokio::test]
    async fn test_primary_empty_is_not_backup_empty() {
        let (service, _, _) = setup();
        let response = service.list_with_fallback().await.unwrap();
        assert_eq!(response.source, Source::Primary);
        assert_eq!(response.data, ListedItems::Rows(vec![]));
    }

    #[tokio::test]
    async fn test_list_falls_back_to_empty_buffer() {
        let (service, primary, _) = setup();
        primary.down.store(true, Ordering::SeqCst);

        let response = service.list_with_fallback().await.unwrap();
        assert_eq!(response, ListResponse::backup_empty());
    }

    #[tokio::test]
    async fn test_create_buffers_when_primary_down() {
        let (service, primary, backup) = setup();
        primary.down.store(true, Ordering::SeqCst);

        let response = service.create_with_fallback(test_item("buffered")).await.unwrap();
        assert_eq!(response.source, Source::Backup);
        assert_eq!(response.status, WriteStatus::Degraded);
        assert_eq!(response.message, Some(MSG_BUFFERED));
        assert_eq!(response.data, test_item("buffered"));

        let raw = backup.read_all().await.unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(Item::from_backup_entry(&raw[0]).unwrap(), test_item("buffered"));
    }

    #[tokio::test]
    async fn test_list_serves_buffered_entries() {
        let (service, primary, _) = setup();
        primary.down.store(true, Ordering::SeqCst);

        service.create_with_fallback(test_item("one")).await.unwrap();
        service.create_with_fallback(test_item("two")).await.unwrap();

        let response = service.list_with_fallback().await.unwrap();
        assert_eq!(response.source, Source::Backup);
        assert_eq!(response.message, Some("emergency mode"));
        assert_eq!(
            response.data,
            ListedItems::Buffered(vec![test_item("two"), test_item("one")])
        );
    }

    #[tokio::test]
    async fn test_buffer_not_consulted_when_primary_up() {
        let (service, primary, backup) = setup();
        backup.push(&test_item("stale").to_backup_entry().unwrap()).await.unwrap();
        primary.inner.create(&test_item("live")).await.unwrap();

        let response = service.list_with_fallback().await.unwrap();
        assert_eq!(response.source, Source::Primary);
        assert_eq!(response.data.len(), 1);
        assert_eq!(backup.len(), 1);
    }

    #[tokio::test]
    async fn test_recovered_primary_does_not_replay_buffer() {
        let (service, primary, backup) = setup();
        primary.down.store(true, Ordering::SeqCst);
        service.create_with_fallback(test_item("lost")).await.unwrap();

        primary.down.store(false, Ordering::SeqCst);
        let response = service.list_with_fallback().await.unwrap();
        assert_eq!(response.source, Source::Primary);
        assert!(response.data.is_empty());
        assert_eq!(backup.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_entries_skipped() {
        let (service, primary, backup) = setup();
        primary.down.store(true, Ordering::SeqCst);
        backup.push("not json").await.unwrap();
        backup.push(&test_item("ok").to_backup_entry().unwrap()).await.unwrap();

        let response = service.list_with_fallback().await.unwrap();
        assert_eq!(response.source, Source::Backup);
        assert_eq!(response.data, ListedItems::Buffered(vec![test_item("ok")]));
    }

    #[tokio::test]
    async fn test_both_stores_down() {
        let primary = Arc::new(SwitchablePrimary::new());
        primary.down.store(true, Ordering::SeqCst);
        let service = InventoryService::new(primary, Arc::new(BrokenBuffer));

        assert!(matches!(service.list_with_fallback().await, Err(StorageError::Unavailable(_))));
        assert!(matches!(
            service.create_with_fallback(test_item("x")).await,
            Err(StorageError::Unavailable(_))
        ));
    }
}
