//! Storage Error Types

use thiserror::Error;

/// Backend-agnostic error for graph storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Schema error: {0}")]
    Schema(String),

    /// An edge or participant points at a node that does not exist
    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Text index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Operation attempted outside a writer session: {0}")]
    NotInSession(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Create a generic backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Errors that leave the process unable to continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::NotInSession(_))
    }

    /// Errors caused by the data the caller supplied rather than the backend
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::ReferentialIntegrity(_) | Self::ConstraintViolation(_) | Self::InvalidOperation(_)
        )
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
