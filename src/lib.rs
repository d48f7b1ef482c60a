//! # Hybrid Inventory
//!
//! An inventory REST service whose item CRUD survives a primary-store outage
//! by falling back to a Redis list, plus document CRUD for laboratories with
//! nested items and maintenance history.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HTTP (axum Router)                      │
//! │  • /laboratories/items/...  → InventoryService             │
//! │  • /laboratories/...        → LabService                   │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────┐
//! │       InventoryService       │  │        LabService        │
//! │  • list/create: fallback     │  │  • plain CRUD, no        │
//! │  • update/delete: primary    │  │    fallback              │
//! └──────────────────────────────┘  └──────────────────────────┘
//!        │                │                      │
//!        ▼                ▼                      ▼
//! ┌──────────────┐ ┌──────────────┐  ┌──────────────────────────┐
//! │ PrimaryStore │ │ BackupBuffer │  │      DocumentStore       │
//! │ MySQL/SQLite │ │  Redis list  │  │  JSON docs in SQL rows   │
//! └──────────────┘ └──────────────┘  └──────────────────────────┘
//! ```
//!
//! The fallback is asymmetric. A failed create is pushed onto the buffer and
//! answered with `status: degraded`; a failed list reads the buffer instead.
//! Update and delete only ever touch the primary store, and nothing drains
//! the buffer back into it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hybrid_inventory::http::{create_router, AppState};
//! use hybrid_inventory::storage::{documents::SqlDocumentStore, redis::RedisBackupBuffer, sql::SqlItemStore};
//! use hybrid_inventory::{InventoryConfig, InventoryService, LabService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = InventoryConfig::default();
//!     let pool = config.sql_pool_config();
//!
//!     let primary = SqlItemStore::new(&config.sql_url, &pool).await?;
//!     let backup = RedisBackupBuffer::new(&config.redis_url).await?;
//!     let documents = SqlDocumentStore::new(&config.document_url, &pool).await?;
//!
//!     let state = AppState::new(
//!         InventoryService::new(Arc::new(primary), Arc::new(backup)),
//!         LabService::new(Arc::new(documents)),
//!     );
//!     let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`inventory`]: Fallback read/write paths and direct update/delete
//! - [`labs`]: Laboratory documents, lab items, maintenance records
//! - [`storage`]: Store traits and backends (SQL, Redis, memory)
//! - [`http`]: Router, handler state, error → status mapping
//! - [`resilience`]: Startup retry
//! - [`config`]: Layered configuration

pub mod config;
pub mod item;
pub mod storage;
pub mod resilience;
pub mod inventory;
pub mod labs;
pub mod http;
pub mod metrics;

pub use config::{ConfigError, InventoryConfig};
pub use item::{Item, StoredItem};
pub use inventory::{DeleteResponse, InventoryService, ListResponse, Source, WriteResponse, WriteStatus};
pub use labs::{LabError, LabId, LabItem, LabService, Laboratory, MaintenanceRecord};
pub use resilience::retry::RetryConfig;
pub use storage::traits::{BackupBuffer, DocumentStore, PrimaryStore, StorageError, UpdateResult};
