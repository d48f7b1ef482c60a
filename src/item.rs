// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Inventory item data structures.
//!
//! [`Item`] is the write payload accepted by the API and the exact shape that
//! lands in the backup buffer when the primary store rejects a write.
//! [`StoredItem`] is a row as the primary store returns it.
//!
//! # Example
//!
//! ```
//! use hybrid_inventory::Item;
//! use serde_json::json;
//!
//! // Clients may send either `code` or `name` for the item label
//! let item: Item = serde_json::from_value(json!({
//!     "name": "PC-014",
//!     "type": "Computer",
//!     "status": "Operational",
//!     "area": "Networks"
//! })).unwrap();
//!
//! assert_eq!(item.code, "PC-014");
//! assert_eq!(serde_json::to_value(&item).unwrap()["code"], "PC-014");
//! ```

use serde::{Deserialize, Serialize};

/// An inventory item as submitted by a client.
///
/// Serializes as `{"code", "type", "status", "area"}`. This serialization is
/// also the backup entry format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item label (inventory code). Accepts `name` on input.
    #[serde(alias = "name")]
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub area: String,
}

impl Item {
    pub fn new(
        code: impl Into<String>,
        kind: impl Into<String>,
        status: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            kind: kind.into(),
            status: status.into(),
            area: area.into(),
        }
    }

    /// Serialize to a backup entry (JSON text).
    pub fn to_backup_entry(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a backup entry written by [`Item::to_backup_entry`].
    pub fn from_backup_entry(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A row from the primary store.
///
/// The primary column for the item label is `name`; [`Item::code`] maps onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub area: String,
}

impl StoredItem {
    pub fn from_item(id: i64, item: &Item) -> Self {
        Self {
            id,
            name: item.code.clone(),
            kind: item.kind.clone(),
            status: item.status.clone(),
            area: item.area.clone(),
        }
    }

    /// The payload view of this row (drops the id).
    pub fn to_item(&self) -> Item {
        Item {
            code: self.name.clone(),
            kind: self.kind.clone(),
            status: self.status.clone(),
            area: self.area.clone(),
        }
    }
}
