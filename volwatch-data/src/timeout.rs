//! Timeout wrapper for trade fetches.
//!
//! Bounds a single fetch future by a deadline and converts an elapsed deadline into a
//! [`DataError::FetchTimeout`]. This applies independently of any transport-level timeout,
//! so fetchers that never time out on their own are still bounded.

use crate::error::DataError;
use std::{future::Future, time::Duration};

/// Default per-fetch timeout (5 seconds).
/// If a fetch has not settled within this period, a timeout error is generated.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Drive `fetch` to completion unless `timeout` elapses first.
///
/// The fetch future is dropped on timeout, cancelling the in-flight request.
pub async fn with_fetch_timeout<Fut, T>(
    instrument: &str,
    timeout: Duration,
    fetch: Fut,
) -> Result<T, DataError>
where
    Fut: Future<Output = Result<T, DataError>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_elapsed) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(
                instrument,
                timeout_ms,
                "trade fetch deadline elapsed - cancelling request"
            );
            Err(DataError::fetch_timeout(instrument, timeout_ms))
        }
    }
}
