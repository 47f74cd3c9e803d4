// src/error_recovery.rs
//! Retry with backoff for transient API failures.

use crate::constants::{CATEGORY_FETCH_ATTEMPTS, CATEGORY_FETCH_BACKOFF};
use crate::error::WikiError;
use std::time::Duration;

/// How often and how patiently to retry a failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Retries with a constant delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            max_delay: delay,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::fixed(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(CATEGORY_FETCH_ATTEMPTS, CATEGORY_FETCH_BACKOFF)
    }
}

/// Retries `operation` while it fails with a retryable error.
///
/// Non-retryable errors are returned immediately. After the last attempt
/// the last error is returned.
pub fn retry_with_backoff<F, T>(policy: RetryPolicy, mut operation: F) -> Result<T, WikiError>
where
    F: FnMut() -> Result<T, WikiError>,
{
    let mut delay = policy.initial_delay;
    let attempts = policy.max_attempts.max(1);

    let mut attempt = 1;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < attempts => {
                log::warn!("Attempt {} failed ({}), retrying after {:?}", attempt, e, delay);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                delay = std::cmp::min(delay * 2, policy.max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
