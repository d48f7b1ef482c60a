// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL-backed document store for laboratory documents.
//!
//! Each laboratory is one row holding the whole document as JSON text:
//! ```sql
//! CREATE TABLE laboratories (
//!   id CHAR(24) PRIMARY KEY,
//!   doc LONGTEXT NOT NULL
//! )
//! ```
//!
//! Nested array operations (`items[]`, `items[].maintenance_history[]`) load
//! the document, mutate it and write it back inside one transaction, so two
//! concurrent mutations of the same lab serialize on the row. On SQLite they
//! also queue behind the store's write gate, since the whole file is the lock.
//!
//! JSON functions still work against the text column for ad-hoc queries:
//! ```sql
//! SELECT id FROM laboratories WHERE JSON_LENGTH(doc, '$.items') > 10;
//! ```

use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::item::Item;
use crate::labs::{LabId, LabItem, Laboratory, MaintenanceRecord};
use crate::resilience::retry::{retry, RetryConfig};
use super::sql::{connect_lazy_pool, map_sqlx_error, SqlPoolConfig, WriteGate};
use super::traits::{DocumentStore, StorageError, UpdateResult};

pub struct SqlDocumentStore {
    pool: AnyPool,
    is_sqlite: bool,
    schema: OnceCell<()>,
    writes: WriteGate,
}

impl SqlDocumentStore {
    /// Connect and create the table now, retrying with [`RetryConfig::startup`].
    pub async fn new(connection_string: &str, pool_config: &SqlPoolConfig) -> Result<Self, StorageError> {
        let store = Self::connect_lazy(connection_string, pool_config)?;
        store.warm_up().await?;
        Ok(store)
    }

    pub fn connect_lazy(connection_string: &str, pool_config: &SqlPoolConfig) -> Result<Self, StorageError> {
        let is_sqlite = connection_string.starts_with("sqlite:");
        Ok(Self {
            pool: connect_lazy_pool(connection_string, pool_config)?,
            is_sqlite,
            schema: OnceCell::new(),
            writes: WriteGate::new(is_sqlite),
        })
    }

    pub async fn warm_up(&self) -> Result<(), StorageError> {
        retry("sql_init_documents", &RetryConfig::startup(), || self.ensure_schema()).await
    }

    pub fn pool(&self) -> AnyPool {
        self.pool.clone()
    }

    async fn create_table(&self) -> Result<(), StorageError> {
        let sql = if self.is_sqlite {
            "CREATE TABLE IF NOT EXISTS laboratories (id TEXT PRIMARY KEY, doc TEXT NOT NULL)"
        } else {
            "CREATE TABLE IF NOT EXISTS laboratories (id CHAR(24) PRIMARY KEY, doc LONGTEXT NOT NULL)"
        };

        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        info!(sqlite = self.is_sqlite, "Laboratory document store ready");
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.schema.get_or_try_init(|| self.create_table()).await.map(|_| ())
    }

    /// Decode the `doc` column.
    ///
    /// The `Any` driver hands MySQL LONGTEXT back as bytes, SQLite TEXT as a string.
    fn decode_doc(row: &AnyRow) -> Result<Laboratory, StorageError> {
        let text: String = match row.try_get::<String, _>("doc") {
            Ok(s) => s,
            Err(_) => {
                let bytes: Vec<u8> = row.try_get("doc").map_err(map_sqlx_error)?;
                String::from_utf8(bytes)
                    .map_err(|e| StorageError::Serialization(format!("document is not UTF-8: {}", e)))?
            }
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn select_for_update(&self) -> &'static str {
        if self.is_sqlite {
            "SELECT doc FROM laboratories WHERE id = ?"
        } else {
            "SELECT doc FROM laboratories WHERE id = ? FOR UPDATE"
        }
    }

    /// Load, mutate and store one lab inside a transaction.
    ///
    /// `mutate` reports what it matched; nothing is written when it modified nothing.
    async fn modify<F>(&self, lab_id: &LabId, mutate: F) -> Result<UpdateResult, StorageError>
    where
        F: FnOnce(&mut Laboratory) -> UpdateResult + Send,
    {
        self.ensure_schema().await?;
        let _gate = self.writes.enter().await;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query(self.select_for_update())
            .bind(lab_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(UpdateResult::NONE);
        };

        let mut lab = Self::decode_doc(&row)?;
        let result = mutate(&mut lab);

        if result.modified > 0 {
            let doc = serde_json::to_string(&lab)?;
            sqlx::query("UPDATE laboratories SET doc = ? WHERE id = ?")
                .bind(doc)
                .bind(lab_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(lab_id = %lab_id, matched = result.matched, modified = result.modified, "Laboratory modified");
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for SqlDocumentStore {
    async fn insert_lab(&self, lab: &Laboratory) -> Result<(), StorageError> {
        self.ensure_schema().await?;
        let doc = serde_json::to_string(lab)?;
        let _gate = self.writes.enter().await;
        sqlx::query("INSERT INTO laboratories (id, doc) VALUES (?, ?)")
            .bind(lab.id.as_str())
            .bind(doc)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_lab(&self, id: &LabId) -> Result<Option<Laboratory>, StorageError> {
        self.ensure_schema().await?;
        let row = sqlx::query("SELECT doc FROM laboratories WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(Self::decode_doc).transpose()
    }

    async fn list_labs(&self) -> Result<Vec<Laboratory>, StorageError> {
        self.ensure_schema().await?;
        let rows = sqlx::query("SELECT doc FROM laboratories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::decode_doc).collect()
    }

    async fn delete_lab(&self, id: &LabId) -> Result<u64, StorageError> {
        self.ensure_schema().await?;
        let _gate = self.writes.enter().await;
        let result = sqlx::query("DELETE FROM laboratories WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn push_item(&self, lab_id: &LabId, item: &LabItem) -> Result<UpdateResult, StorageError> {
        let item = item.clone();
        self.modify(lab_id, move |lab| {
            lab.items.push(item);
            UpdateResult::ONE
        })
        .await
    }

    async fn update_item(&self, lab_id: &LabId, item_id: &str, item: &Item) -> Result<UpdateResult, StorageError> {
        self.modify(lab_id, |lab| match lab.item_mut(item_id) {
            Some(target) => {
                let before = target.clone();
                target.apply(item);
                UpdateResult { matched: 1, modified: u64::from(*target != before) }
            }
            None => UpdateResult::NONE,
        })
        .await
    }

    async fn push_maintenance(
        &self,
        lab_id: &LabId,
        item_id: &str,
        record: &MaintenanceRecord,
    ) -> Result<UpdateResult, StorageError> {
        let record = record.clone();
        self.modify(lab_id, move |lab| match lab.item_mut(item_id) {
            Some(target) => {
                target.maintenance_history.push(record);
                UpdateResult::ONE
            }
            None => UpdateResult::NONE,
        })
        .await
    }

    async fn pull_item(&self, lab_id: &LabId, item_id: &str) -> Result<UpdateResult, StorageError> {
        self.modify(lab_id, |lab| match lab.items.iter().position(|i| i.id == item_id) {
            Some(pos) => {
                lab.items.remove(pos);
                UpdateResult::ONE
            }
            None => UpdateResult::NONE,
        })
        .await
    }
}
