//! Error types for the backend seams.

use thiserror::Error;

/// Errors reported by an [`OrderStore`](crate::store::OrderStore) or
/// [`ChangeFeed`](crate::store::ChangeFeed) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never reached the backend or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// The backend refused the request (auth, row-level policy, validation).
    #[error("Request rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    /// A row or change payload did not have the expected shape.
    #[error("Malformed row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store unavailable")]
    Unavailable,
}
