use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `volwatch-data`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum DataError {
    #[error("trade fetch for {instrument} timed out after {timeout_ms}ms")]
    FetchTimeout { instrument: String, timeout_ms: u64 },

    #[error("trade fetch for {instrument} failed: {reason}")]
    FetchFailed { instrument: String, reason: String },

    #[error("invalid trade fetcher configuration: {0}")]
    Config(String),
}

impl DataError {
    pub fn fetch_timeout(instrument: impl Into<String>, timeout_ms: u64) -> Self {
        Self::FetchTimeout {
            instrument: instrument.into(),
            timeout_ms,
        }
    }

    pub fn fetch_failed(instrument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            instrument: instrument.into(),
            reason: reason.into(),
        }
    }

    /// Determine if the fetch did not complete before its deadline, as opposed to
    /// completing with an error or an unusable payload.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DataError::FetchTimeout { .. })
    }

    /// Instrument the failed fetch was issued for, if the error is fetch scoped.
    pub fn instrument(&self) -> Option<&str> {
        match self {
            DataError::FetchTimeout { instrument, .. }
            | DataError::FetchFailed { instrument, .. } => Some(instrument),
            DataError::Config(_) => None,
        }
    }
}
