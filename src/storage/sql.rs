// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL storage backend for the primary item store.
//!
//! One row per item:
//! ```sql
//! CREATE TABLE items (
//!   id BIGINT AUTO_INCREMENT PRIMARY KEY,
//!   name VARCHAR(255) NOT NULL,
//!   type VARCHAR(100) NOT NULL,
//!   status VARCHAR(100) NOT NULL,
//!   area VARCHAR(255) NOT NULL
//! )
//! ```
//!
//! Works against MySQL (production) or SQLite (local runs, tests) through
//! sqlx's `Any` driver. Request-path queries are attempted exactly once:
//! a failure surfaces immediately so the caller can take the fallback path.
//!
//! Pools connect lazily, so a store can be built while its database is
//! down. The table is created on first successful use, or up front by
//! [`SqlItemStore::warm_up`], which is the only place that retries.

use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{debug, info};

use crate::item::{Item, StoredItem};
use crate::resilience::retry::{retry, RetryConfig};
use super::traits::{PrimaryStore, StorageError};

// SQLx `Any` driver requires runtime installation
static INSTALL_DRIVERS: Once = Once::new();

fn install_drivers() {
    INSTALL_DRIVERS.call_once(|| {
        sqlx::any::install_default_drivers();
    });
}

/// Pool sizing shared by the SQL-backed stores.
#[derive(Debug, Clone)]
pub struct SqlPoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for SqlPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Build a pool without opening a connection.
///
/// Only a malformed connection string fails here. Connections are made on
/// first acquire, bounded by `acquire_timeout`.
pub(crate) fn connect_lazy_pool(
    connection_string: &str,
    pool_config: &SqlPoolConfig,
) -> Result<AnyPool, StorageError> {
    install_drivers();

    AnyPoolOptions::new()
        .max_connections(pool_config.max_connections)
        .acquire_timeout(pool_config.acquire_timeout)
        .idle_timeout(Duration::from_secs(300))
        .connect_lazy(connection_string)
        .map_err(map_sqlx_error)
}

/// Queues writers to a SQLite database.
///
/// SQLite allows one writer. Two deferred transactions that both read and
/// then write fail the lock upgrade with `SQLITE_BUSY` instead of waiting,
/// so every write goes through here first. MySQL takes row locks and
/// passes straight through.
pub(crate) struct WriteGate(Option<Mutex<()>>);

impl WriteGate {
    pub(crate) fn new(is_sqlite: bool) -> Self {
        Self(is_sqlite.then(|| Mutex::new(())))
    }

    pub(crate) async fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.0 {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

/// Classify a driver error for the fallback decision.
///
/// Connectivity problems become [`StorageError::Unavailable`], constraint
/// violations [`StorageError::Constraint`], everything else `Backend`.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StorageError::Unavailable(err.to_string()),
        sqlx::Error::Database(ref db) => match db.kind() {
            sqlx::error::ErrorKind::UniqueViolation
            | sqlx::error::ErrorKind::ForeignKeyViolation
            | sqlx::error::ErrorKind::NotNullViolation
            | sqlx::error::ErrorKind::CheckViolation => StorageError::Constraint(db.message().to_string()),
            _ => StorageError::Backend(err.to_string()),
        },
        sqlx::Error::RowNotFound => StorageError::NotFound,
        other => StorageError::Backend(other.to_string()),
    }
}

pub struct SqlItemStore {
    pool: AnyPool,
    is_sqlite: bool,
    schema: OnceCell<()>,
    writes: WriteGate,
}

impl SqlItemStore {
    /// Connect and create the `items` table now, retrying with
    /// [`RetryConfig::startup`]. Fails if the database stays unreachable.
    pub async fn new(connection_string: &str, pool_config: &SqlPoolConfig) -> Result<Self, StorageError> {
        let store = Self::connect_lazy(connection_string, pool_config)?;
        store.warm_up().await?;
        Ok(store)
    }

    /// Build the store without touching the database.
    pub fn connect_lazy(connection_string: &str, pool_config: &SqlPoolConfig) -> Result<Self, StorageError> {
        let is_sqlite = connection_string.starts_with("sqlite:");
        Ok(Self {
            pool: connect_lazy_pool(connection_string, pool_config)?,
            is_sqlite,
            schema: OnceCell::new(),
            writes: WriteGate::new(is_sqlite),
        })
    }

    /// Create the schema ahead of the first request.
    pub async fn warm_up(&self) -> Result<(), StorageError> {
        retry("sql_init_schema", &RetryConfig::startup(), || self.ensure_schema()).await
    }

    /// Get a clone of the connection pool.
    pub fn pool(&self) -> AnyPool {
        self.pool.clone()
    }

    async fn create_table(&self) -> Result<(), StorageError> {
        let sql = if self.is_sqlite {
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                status TEXT NOT NULL,
                area TEXT NOT NULL
            )
            "#
        } else {
            // BIGINT so the Any driver decodes ids as i64
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                type VARCHAR(100) NOT NULL,
                status VARCHAR(100) NOT NULL,
                area VARCHAR(255) NOT NULL
            )
            "#
        };

        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        info!(sqlite = self.is_sqlite, "Primary item store ready");
        Ok(())
    }

    /// Runs until the table has been created once; a failure is retried on the next call.
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.schema.get_or_try_init(|| self.create_table()).await.map(|_| ())
    }

    fn row_to_item(row: &AnyRow) -> Result<StoredItem, StorageError> {
        let get = |col: &str| -> Result<String, StorageError> {
            row.try_get::<String, _>(col).map_err(map_sqlx_error)
        };
        Ok(StoredItem {
            id: row.try_get("id").map_err(map_sqlx_error)?,
            name: get("name")?,
            kind: get("type")?,
            status: get("status")?,
            area: get("area")?,
        })
    }
}

#[async_trait]
impl PrimaryStore for SqlItemStore {
    async fn list(&self) -> Result<Vec<StoredItem>, StorageError> {
        self.ensure_schema().await?;
        let rows = sqlx::query("SELECT id, name, type, status, area FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn create(&self, item: &Item) -> Result<StoredItem, StorageError> {
        self.ensure_schema().await?;
        let _gate = self.writes.enter().await;
        let result = sqlx::query("INSERT INTO items (name, type, status, area) VALUES (?, ?, ?, ?)")
            .bind(&item.code)
            .bind(&item.kind)
            .bind(&item.status)
            .bind(&item.area)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let id = result
            .last_insert_id()
            .ok_or_else(|| StorageError::Backend("driver did not report an insert id".into()))?;

        debug!(id, code = %item.code, "Item inserted");
        Ok(StoredItem::from_item(id, item))
    }

    async fn update(&self, id: i64, item: &Item) -> Result<StoredItem, StorageError> {
        self.ensure_schema().await?;
        let _gate = self.writes.enter().await;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // MySQL reports 0 affected rows for an unchanged row, so check existence explicitly
        let exists = sqlx::query("SELECT id FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        sqlx::query("UPDATE items SET name = ?, type = ?, status = ?, area = ? WHERE id = ?")
            .bind(&item.code)
            .bind(&item.kind)
            .bind(&item.status)
            .bind(&item.area)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(StoredItem::from_item(id, item))
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.ensure_schema().await?;
        let _gate = self.writes.enter().await;
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
