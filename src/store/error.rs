//! Store error type.

use thiserror::Error;

/// Errors raised by cache and model store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize store entry: {0}")]
    Serialization(#[from] serde_json::Error),
}
