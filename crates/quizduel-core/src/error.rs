//! Domain error types.

use thiserror::Error;

/// Infrastructure-facing error shared by every store and ledger.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A record was not found.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Input or persisted data failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
