//! Retry utilities for the page client.
//!
//! Provides exponential backoff retry logic for transient HTTP failures: the
//! 429/5xx statuses the aggregator returns under load, and network-level
//! errors. Anything else is propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Statuses that are worth another attempt after a pause.
pub(crate) const RETRIABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RetriableStatus`] — 429 or one of the listed 5xx codes.
/// - [`ScraperError::Http`] — network-level failure (connection reset, timeout, etc.).
///
/// Everything else ([`ScraperError::UnexpectedStatus`], [`ScraperError::InvalidUrl`])
/// would fail the same way again.
fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RetriableStatus { .. } | ScraperError::Http(_)
    )
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_ms * 2^attempt`
/// milliseconds and tries again, up to `max_retries` additional attempts after
/// the first try. If all retries are exhausted the last error is returned.
///
/// # Backoff schedule (example with `backoff_base_ms = 500`)
///
/// | Attempt | Sleep before next attempt |
/// |---------|--------------------------|
/// | 0 (initial) | — |
/// | 1 (first retry) | 500 ms |
/// | 2 (second retry) | 1 000 ms |
/// | 3 (third retry) | 2 000 ms |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        let delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %last_err,
            "transient fetch error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
