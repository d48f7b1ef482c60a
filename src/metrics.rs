// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the inventory service.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The binary (or embedding process) chooses the exporter; with none
//! installed every call here is a no-op.
//!
//! # Metric Naming Convention
//! - `inventory_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: list, create, update, delete, lab_*
//! - `source`: PRIMARY, BACKUP, BACKUP_EMPTY
//! - `status`: success, error

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record a served inventory request and which store answered it
pub fn record_request(operation: &str, source: &str) {
    counter!(
        "inventory_requests_total",
        "operation" => operation.to_string(),
        "source" => source.to_string()
    )
    .increment(1);
}

/// Record a primary-store failure that switched a request to the backup buffer
pub fn record_fallback(operation: &str) {
    counter!(
        "inventory_fallback_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record a write accepted into the backup buffer
pub fn record_backup_push() {
    counter!("inventory_backup_pushes_total").increment(1);
}

/// Set the backup buffer length observed on the last fallback read
pub fn set_backup_entries(count: usize) {
    gauge!("inventory_backup_entries").set(count as f64);
}

/// Record a failed operation that surfaced as an error response
pub fn record_error(operation: &str, kind: &str) {
    counter!(
        "inventory_errors_total",
        "operation" => operation.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record a laboratory document operation
pub fn record_lab_operation(operation: &str, status: &str) {
    counter!(
        "inventory_lab_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "inventory_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}
