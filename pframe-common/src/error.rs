//! Common error types for pframe

use thiserror::Error;

/// Common result type for pframe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the pframe services
///
/// The first three kinds are client-caused and safe to report verbatim;
/// `Internal` indicates a data-model bug and is logged before surfacing.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced id absent from the relevant collection or item table
    #[error("Not found: {0}")]
    NotFound(String),

    /// Value outside its declared bound, or a malformed request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation forbidden by the current playlist state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invariant violated unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}
