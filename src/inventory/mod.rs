// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Global inventory service.
//!
//! The [`InventoryService`] fronts the primary store and the backup buffer:
//!
//! ```text
//!   list   ──► primary.list() ──ok──► {source: PRIMARY}
//!                   │
//!                  err ──► buffer.read_all() ──empty──► {source: BACKUP_EMPTY}
//!                                     └──────entries──► {source: BACKUP}
//!
//!   create ──► primary.create() ──ok──► {source: PRIMARY, status: success}
//!                   │
//!                  err ──► buffer.push(item) ──► {source: BACKUP, status: degraded}
//!
//!   update / delete ──► primary only (no fallback)
//! ```
//!
//! The failover is decided once per call: no retry, no timeout, no merge of
//! primary rows with buffered entries. Buffered entries are never replayed
//! into the primary store and a fallback read does not remove them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hybrid_inventory::{InventoryService, Item, Source};
//! use hybrid_inventory::storage::memory::{InMemoryPrimaryStore, InMemoryBackupBuffer};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let service = InventoryService::new(
//!     Arc::new(InMemoryPrimaryStore::new()),
//!     Arc::new(InMemoryBackupBuffer::new()),
//! );
//!
//! let created = service.create_with_fallback(Item::new("PC-1", "Computer", "Operational", "Lab A")).await.unwrap();
//! assert_eq!(created.source, Source::Primary);
//!
//! let listed = service.list_with_fallback().await.unwrap();
//! assert_eq!(listed.source, Source::Primary);
//! assert_eq!(listed.data.len(), 1);
//! # }
//! ```

mod types;
mod fallback;
mod direct;

pub use types::{
    DeleteResponse, ListResponse, ListedItems, Source, WriteResponse, WriteStatus,
    MSG_BACKUP_EMPTY, MSG_BUFFERED, MSG_EMERGENCY,
};

use std::sync::Arc;

use crate::storage::traits::{BackupBuffer, PrimaryStore};

/// Item CRUD with backup-buffer failover on list and create.
///
/// Both stores are injected; the service holds no state of its own, so it is
/// cheap to clone into every request handler.
#[derive(Clone)]
pub struct InventoryService {
    primary: Arc<dyn PrimaryStore>,
    backup: Arc<dyn BackupBuffer>,
}

impl InventoryService {
    pub fn new(primary: Arc<dyn PrimaryStore>, backup: Arc<dyn BackupBuffer>) -> Self {
        Self { primary, backup }
    }
}
