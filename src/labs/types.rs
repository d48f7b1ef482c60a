// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Laboratory document types.
//!
//! A laboratory is one document holding an `items` array; each item holds a
//! `maintenance_history` array. Lab documents are addressed by a [`LabId`];
//! nested items and maintenance records by generated UUID strings.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::item::Item;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid laboratory id '{0}': expected 24 hex characters")]
pub struct InvalidLabId(pub String);

/// Document-store identifier for a laboratory: 12 bytes, hex encoded.
///
/// Layout: 4-byte big-endian creation time (seconds) followed by 8 random bytes.
///
/// ```
/// use hybrid_inventory::LabId;
///
/// assert!(LabId::parse("65a1f0c2b3d4e5f6a7b8c9d0").is_ok());
/// assert!(LabId::parse("not-an-id").is_err());
///
/// let fresh = LabId::generate();
/// assert_eq!(fresh.as_str().len(), 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabId(String);

impl LabId {
    pub const LEN: usize = 24;

    pub fn parse(raw: &str) -> Result<Self, InvalidLabId> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(InvalidLabId(raw.to_string()))
        }
    }

    #[must_use]
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        let random = uuid::Uuid::new_v4();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[..8]);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LabId {
    type Error = InvalidLabId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LabId> for String {
    fn from(id: LabId) -> Self {
        id.0
    }
}

/// A laboratory document.
///
/// Fields the API doesn't model are kept in `extra` and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laboratory {
    pub id: LabId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub items: Vec<LabItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Laboratory {
    pub fn item(&self, item_id: &str) -> Option<&LabItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut LabItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

/// Create payload for a laboratory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewLaboratory {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewLaboratory {
    /// Build the stored document: fresh id, empty `items`.
    ///
    /// Client-supplied `id`, `_id` and `items` keys are discarded.
    pub fn into_laboratory(self, id: LabId) -> Laboratory {
        let mut extra = self.extra;
        for reserved in ["id", "_id", "items"] {
            extra.remove(reserved);
        }
        Laboratory {
            id,
            name: self.name,
            location: self.location,
            items: Vec::new(),
            extra,
        }
    }
}

/// An item nested inside a laboratory document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabItem {
    pub id: String,
    #[serde(alias = "name")]
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<String>,
    #[serde(default)]
    pub maintenance_history: Vec<MaintenanceRecord>,
}

impl LabItem {
    /// New item with a fresh id and an empty maintenance history.
    pub fn new(input: LabItemInput) -> Self {
        let LabItemInput { item, acquisition_date } = input;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code: item.code,
            kind: item.kind,
            status: item.status,
            area: item.area,
            acquisition_date,
            maintenance_history: Vec::new(),
        }
    }

    /// Overwrite the descriptive fields. Id, acquisition date and history are untouched.
    pub fn apply(&mut self, item: &Item) {
        self.code = item.code.clone();
        self.kind = item.kind.clone();
        self.status = item.status.clone();
        self.area = item.area.clone();
    }
}

/// Payload for adding an item to a laboratory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabItemInput {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default)]
    pub acquisition_date: Option<String>,
}

impl From<Item> for LabItemInput {
    fn from(item: Item) -> Self {
        Self { item, acquisition_date: None }
    }
}

/// One maintenance entry. Free-form fields plus a generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MaintenanceRecord {
    /// Wrap client fields (`date`, `technician`, `type`, `description`, ...).
    /// Any client `id` is replaced.
    pub fn new(mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            fields,
        }
    }
}
