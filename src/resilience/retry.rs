// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Retry logic with exponential backoff.
//!
//! Used while the service starts: connecting to MySQL, Redis and creating
//! tables. Request-path operations never go through here; a failed primary
//! read or write is answered from the backup buffer on the first failure.
//!
//! # Example
//!
//! ```
//! use hybrid_inventory::RetryConfig;
//! use std::time::Duration;
//!
//! // Startup: fail fast on bad config
//! let startup = RetryConfig::startup();
//! assert_eq!(startup.max_retries, Some(5));
//! assert_eq!(startup.initial_delay, Duration::from_millis(200));
//! ```

use std::time::Duration;
use tokio::time::sleep;
use tracing::{warn, info};
use std::future::Future;

/// Configuration for connection retry behavior.
///
/// `max_retries: None` retries forever.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    pub max_retries: Option<usize>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::startup()
    }
}

impl RetryConfig {
    /// Fast-fail retry for initial startup connection.
    /// Attempts 5 times with exponential backoff, failing after ~5 seconds.
    #[must_use]
    pub fn startup() -> Self {
        Self {
            max_retries: Some(5),
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            factor: 2.0,
        }
    }

    /// Fast retry for tests (minimal delays)
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            max_retries: Some(3),
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            factor: 2.0,
        }
    }
}

/// Run `operation` until it succeeds or `config.max_retries` attempts fail.
///
/// The last error is returned unchanged.
pub async fn retry<F, Fut, T, E>(
    operation_name: &str,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut failures = 0usize;

    loop {
        let err = match operation().await {
            Ok(val) => {
                if failures > 0 {
                    info!(operation = operation_name, failures, "Startup operation recovered");
                }
                return Ok(val);
            }
            Err(err) => err,
        };

        failures += 1;
        if config.max_retries.is_some_and(|max| failures >= max) {
            return Err(err);
        }

        warn!(
            operation = operation_name,
            attempt = failures,
            max_attempts = ?config.max_retries,
            retry_in_ms = delay.as_millis() as u64,
            error = %err,
            "Startup operation failed, retrying"
        );

        sleep(delay).await;
        delay = delay.mul_f64(config.factor).min(config.max_delay);
    }
}
