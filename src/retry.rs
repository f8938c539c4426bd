//! Retry logic restricted to configurable error kinds
//!
//! An operation is retried only when its error kind is listed in
//! [`RetryConfig::retry_on`]. Any other failure is returned immediately. Once
//! [`RetryConfig::try_limit`] attempts have failed, the last error is wrapped in
//! [`Error::RetriesExhausted`] naming the operation and the item.
//!
//! # Example
//!
//! ```no_run
//! use mugimugi_image::config::RetryConfig;
//! use mugimugi_image::error::{Error, Result};
//! use mugimugi_image::retry::execute_with_retry;
//!
//! # async fn example() -> Result<()> {
//! let config = RetryConfig::default();
//! let doubled = execute_with_retry("double", &|n: u64| async move { Ok::<_, Error>(n * 2) }, 21, &config).await?;
//! assert_eq!(doubled, 42);
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use rand::Rng;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

/// Execute `operation(item)` with the retry policy in `config`
///
/// # Arguments
///
/// * `operation_name` - Name used in logs and in the exhausted-retries error
/// * `operation` - Async operation; every attempt receives a fresh clone of `item`
/// * `item` - Input of the operation
/// * `config` - Attempt budget, retryable kinds and backoff settings
///
/// # Returns
///
/// The first successful result, the first non-retryable error unchanged, or
/// [`Error::RetriesExhausted`] after `try_limit` failed attempts. A `try_limit`
/// of 0 is treated as 1.
pub async fn execute_with_retry<U, V, F, Fut>(
    operation_name: &str,
    operation: &F,
    item: U,
    config: &RetryConfig,
) -> Result<V>
where
    U: Clone + Debug,
    F: Fn(U) -> Fut,
    Fut: Future<Output = Result<V>>,
{
    let try_limit = config.try_limit.max(1);
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;
        match operation(item.clone()).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        item = ?item,
                        attempts = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) if !e.is_retryable_in(&config.retry_on) => {
                tracing::error!(
                    operation = operation_name,
                    item = ?item,
                    error = %e,
                    "Operation failed with non-retryable error"
                );
                return Err(e);
            }
            Err(e) if attempt >= try_limit => {
                tracing::error!(
                    operation = operation_name,
                    item = ?item,
                    error = %e,
                    attempts = attempt,
                    "Operation failed after all retry attempts exhausted"
                );
                return Err(Error::RetriesExhausted {
                    operation: operation_name.to_string(),
                    item: format!("{item:?}"),
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                tracing::warn!(
                    operation = operation_name,
                    item = ?item,
                    error = %e,
                    attempt = attempt,
                    try_limit = try_limit,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                if !delay.is_zero() {
                    let wait = if config.jitter {
                        add_jitter(delay)
                    } else {
                        delay
                    };
                    tokio::time::sleep(wait).await;

                    delay = Duration::try_from_secs_f64(
                        delay.as_secs_f64() * config.backoff_multiplier,
                    )
                    .unwrap_or(config.max_delay)
                    .min(config.max_delay);
                }
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// The result is uniformly distributed between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
