//! Error types for the persistence layer

use crate::snapshot::Collection;
use thiserror::Error;

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store refused the operation; retrying will not help
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Update of a document that does not exist
    #[error("Document not found: {collection}/{key}")]
    NotFound { collection: Collection, key: String },

    /// An `Expect` operation saw a different value
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend could not be reached or did not answer
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data is not in the expected shape
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Invalid operation for current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl StoreError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create a new invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create a new permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a new unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// True when the store denied access, as opposed to a transient failure
    pub fn is_access_denied(&self) -> bool {
        match self {
            StoreError::PermissionDenied(_) => true,
            StoreError::Io(err) => err.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
