//! Error types for docval.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Rule evaluation problems are not errors at this level: they are recovered
//! by the engine as `DataIntegrityError` issues (see `rules::CheckError`).

use crate::exit_codes;
use thiserror::Error;

/// Main error type for docval operations.
#[derive(Error, Debug)]
pub enum DocvalError {
    /// The requested document type has no rule set.
    #[error("invalid document type: '{0}'")]
    InvalidDocumentType(String),

    /// User provided invalid arguments, input, or configuration.
    #[error("{0}")]
    UserError(String),

    /// One or more documents failed validation.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Session lock could not be acquired.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl DocvalError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DocvalError::InvalidDocumentType(_) => exit_codes::INVALID_DOCUMENT_TYPE,
            DocvalError::UserError(_) => exit_codes::USER_ERROR,
            DocvalError::ValidationFailed(_) => exit_codes::VALIDATION_FAILURE,
            DocvalError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for docval operations.
pub type Result<T> = std::result::Result<T, DocvalError>;
