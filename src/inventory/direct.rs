//! Update and delete: primary store only.
//!
//! Unlike list and create these never touch the backup buffer. A missing row
//! is `NotFound`; any other primary failure propagates as is.

use tracing::{info, warn};

use crate::item::Item;
use crate::metrics;
use crate::storage::traits::StorageError;
use super::types::{DeleteResponse, Source, WriteResponse, WriteStatus};
use super::InventoryService;

fn error_kind(e: &StorageError) -> &'static str {
    match e {
        StorageError::NotFound => "not_found",
        StorageError::Unavailable(_) => "unavailable",
        StorageError::Constraint(_) => "constraint",
        StorageError::Backend(_) => "backend",
        StorageError::Serialization(_) => "serialization",
    }
}

impl InventoryService {
    #[tracing::instrument(skip(self, item))]
    pub async fn update(&self, id: i64, item: Item) -> Result<WriteResponse, StorageError> {
        let _timer = metrics::LatencyTimer::new("update");

        match self.primary.update(id, &item).await {
            Ok(_) => {
                info!(id, "Item updated");
                metrics::record_request("update", Source::Primary.as_str());
                Ok(WriteResponse {
                    source: Source::Primary,
                    status: WriteStatus::Updated,
                    message: None,
                    data: item,
                })
            }
            Err(e) => {
                if !matches!(e, StorageError::NotFound) {
                    warn!(id, error = %e, "Primary store update failed");
                }
                metrics::record_error("update", error_kind(&e));
                Err(e)
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<DeleteResponse, StorageError> {
        let _timer = metrics::LatencyTimer::new("delete");

        match self.primary.delete(id).await {
            Ok(()) => {
                info!(id, "Item deleted");
                metrics::record_request("delete", Source::Primary.as_str());
                Ok(DeleteResponse {
                    source: Source::Primary,
                    status: WriteStatus::Deleted,
                    id,
                })
            }
            Err(e) => {
                if !matches!(e, StorageError::NotFound) {
                    warn!(id, error = %e, "Primary store delete failed");
                }
                metrics::record_error("delete", error_kind(&e));
                Err(e)
            }
        }
    }
}
