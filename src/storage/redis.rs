// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis storage backend for the backup buffer.
//!
//! The buffer is one Redis list. Writes are `LPUSH`, reads are
//! `LRANGE key 0 -1`. Nothing here trims, expires or pops the list; it only
//! shrinks when someone clears the key outside the service.
//!
//! The connection is opened on first use, so the buffer can be built while
//! Redis is down; until it comes up every call fails as unavailable.
//!
//! ```text
//! LPUSH backup_items '{"code":"PC-1","type":"Computer","status":"Operational","area":"A"}'
//! LRANGE backup_items 0 -1
//! ```

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::resilience::retry::{retry, RetryConfig};
use super::traits::{BackupBuffer, StorageError};

/// Default list key.
pub const DEFAULT_BACKUP_KEY: &str = "backup_items";

fn map_redis_error(e: redis::RedisError) -> StorageError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
        StorageError::Unavailable(e.to_string())
    } else {
        StorageError::Backend(e.to_string())
    }
}

pub struct RedisBackupBuffer {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    /// Fully qualified list key (prefix applied)
    key: String,
}

impl RedisBackupBuffer {
    /// Connect using the default key `backup_items` and no prefix.
    pub async fn new(connection_string: &str) -> Result<Self, StorageError> {
        Self::with_key(connection_string, None, DEFAULT_BACKUP_KEY).await
    }

    /// Connect now with an optional key prefix for namespacing a shared Redis.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use hybrid_inventory::storage::redis::RedisBackupBuffer;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// // List lives at "inventory:backup_items"
    /// let buffer = RedisBackupBuffer::with_key("redis://localhost", Some("inventory:"), "backup_items").await?;
    /// assert_eq!(buffer.key(), "inventory:backup_items");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_key(
        connection_string: &str,
        prefix: Option<&str>,
        key: &str,
    ) -> Result<Self, StorageError> {
        let buffer = Self::connect_lazy(connection_string, prefix, key)?;
        buffer.warm_up().await?;
        Ok(buffer)
    }

    /// Build the buffer without connecting. Only a malformed URL fails here.
    pub fn connect_lazy(connection_string: &str, prefix: Option<&str>, key: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: Client::open(connection_string).map_err(map_redis_error)?,
            connection: OnceCell::new(),
            key: format!("{}{}", prefix.unwrap_or(""), key),
        })
    }

    /// Open the connection ahead of the first request.
    pub async fn warm_up(&self) -> Result<(), StorageError> {
        // Fast-fail on startup rather than hanging forever
        retry("redis_connect", &RetryConfig::startup(), || async {
            self.connection().await.map(|_| ())
        })
        .await
    }

    /// The shared manager, connecting on first call. It reconnects by itself after that.
    async fn connection(&self) -> Result<ConnectionManager, StorageError> {
        // Requests wait on this while Redis is down, so keep the attempt short
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_secs(2));

        self.connection
            .get_or_try_init(|| ConnectionManager::new_with_config(self.client.clone(), config))
            .await
            .cloned()
            .map_err(map_redis_error)
    }

    /// The list key as stored in Redis.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of entries currently buffered (`LLEN`).
    pub async fn len(&self) -> Result<u64, StorageError> {
        let mut conn = self.connection().await?;
        conn.llen(&self.key).await.map_err(map_redis_error)
    }
}

#[async_trait]
impl BackupBuffer for RedisBackupBuffer {
    async fn push(&self, entry: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let len: u64 = conn.lpush(&self.key, entry).await.map_err(map_redis_error)?;
        debug!(key = %self.key, len, "Backup entry pushed");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<String>, StorageError> {
        let mut conn = self.connection().await?;
        conn.lrange(&self.key, 0, -1).await.map_err(map_redis_error)
    }
}
