//! Response types for the inventory service.
//!
//! Degradation is reported in the body (`source`, `status`), never through an
//! error: a fallback-served list or a buffered create is still a success.

use serde::Serialize;

use crate::item::{Item, StoredItem};

pub const MSG_BACKUP_EMPTY: &str = "no backup data";
pub const MSG_EMERGENCY: &str = "emergency mode";
pub const MSG_BUFFERED: &str = "store saturated, buffered temporarily";

/// Which store answered the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    /// The relational store of record
    Primary,
    /// The backup buffer (primary failed, buffer had entries / took the write)
    Backup,
    /// The backup buffer, which was empty
    BackupEmpty,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY",
            Self::Backup => "BACKUP",
            Self::BackupEmpty => "BACKUP_EMPTY",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Success,
    /// Accepted into the backup buffer instead of the primary store
    Degraded,
    Updated,
    Deleted,
}

/// Items as listed: primary rows carry ids, buffered entries don't.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ListedItems {
    Rows(Vec<StoredItem>),
    Buffered(Vec<Item>),
}

impl ListedItems {
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Buffered(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of [`super::InventoryService::list_with_fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListResponse {
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: ListedItems,
}

impl ListResponse {
    pub fn primary(rows: Vec<StoredItem>) -> Self {
        Self { source: Source::Primary, message: None, data: ListedItems::Rows(rows) }
    }

    pub fn backup(items: Vec<Item>) -> Self {
        Self { source: Source::Backup, message: Some(MSG_EMERGENCY), data: ListedItems::Buffered(items) }
    }

    pub fn backup_empty() -> Self {
        Self {
            source: Source::BackupEmpty,
            message: Some(MSG_BACKUP_EMPTY),
            data: ListedItems::Buffered(Vec::new()),
        }
    }
}

/// Result of a create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResponse {
    pub source: Source,
    pub status: WriteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: Item,
}

impl WriteResponse {
    pub fn is_degraded(&self) -> bool {
        self.status == WriteStatus::Degraded
    }
}

/// Result of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub source: Source,
    pub status: WriteStatus,
    pub id: i64,
}
