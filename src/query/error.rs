//! Error kinds for the search engine.
//!
//! Validation failures are reported before any query executes. Storage
//! failures surface as a single generic error; the underlying SQLite detail
//! is logged where it happens and never reaches the caller.

use super::kind::EntityKind;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{column}' is not an order column for {kind}")]
    OrderColumnNotAllowed { kind: EntityKind, column: String },

    #[error("'{column}' is not a statistic column for {kind}")]
    StatColumnNotAllowed { kind: EntityKind, column: String },

    #[error("charts are not available for {kind}")]
    ChartNotAvailable { kind: EntityKind },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search request: {0}")]
    Validation(#[from] ValidationError),

    #[error("catalog query failed")]
    QueryFailure,

    #[error("search deadline exceeded")]
    DeadlineExceeded,
}

/// Log the storage detail at WARN and hand the caller the generic failure.
pub(crate) fn storage_failure(operation: &str, error: rusqlite::Error) -> SearchError {
    warn!("{} failed: {}", operation, error);
    SearchError::QueryFailure
}

/// Same policy for collaborator failures (chart rendering).
pub(crate) fn collaborator_failure(operation: &str, error: anyhow::Error) -> SearchError {
    warn!("{} failed: {}", operation, error);
    SearchError::QueryFailure
}
