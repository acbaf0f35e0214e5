//! Retry with exponential back-off and jitter for idempotent backend reads.
//!
//! Only transient failures are retried: timeouts, connect errors, and 5xx
//! responses. Everything else is returned on the first attempt. Writes such
//! as `park-vehicle` never go through here.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY: Duration = Duration::from_secs(10);

pub(crate) fn is_retriable(err: &ApiError) -> bool {
    match err {
        ApiError::Network(e) => e.is_timeout() || e.is_connect(),
        ApiError::BadResponse { status, .. } => status.is_some_and(|s| s >= 500),
        ApiError::Deserialize { .. } | ApiError::InvalidBaseUrl { .. } => false,
    }
}

/// Sleep before retry number `retry` (1-based): `base_ms × 2^(retry-1)`,
/// capped at [`MAX_DELAY`], then scaled by `jitter` (expected in `0.75..1.25`).
fn backoff_delay(retry: u32, base_ms: u64, jitter: f64) -> Duration {
    let exponent = retry.saturating_sub(1).min(16);
    let nominal = Duration::from_millis(base_ms.saturating_mul(1u64 << exponent)).min(MAX_DELAY);
    nominal.mul_f64(jitter.max(0.0))
}

/// Runs `operation`, retrying transient errors up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry >= max_retries || !is_retriable(&err) {
            return Err(err);
        }

        retry += 1;
        let delay = backoff_delay(retry, backoff_base_ms, 0.75 + rand::random::<f64>() * 0.5);
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "backend read failed transiently; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
