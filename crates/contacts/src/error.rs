//! Error types for the orchestration layer.

use database::DatabaseError;
use thiserror::Error;

/// Failures surfaced by an edit session's save and load operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Save was attempted while a gated field is invalid.
    #[error("form is not valid")]
    FormInvalid,

    /// The session was discarded; the operation did nothing.
    #[error("session was discarded")]
    Discarded,

    /// The underlying store operation failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}
