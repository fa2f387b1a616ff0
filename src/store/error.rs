//! Storage error types.

use thiserror::Error;

/// Errors raised by a storage backend.
///
/// A failed write leaves the unit of work unusable; the engine drops it,
/// which rolls back every write buffered in it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint or claim precondition was violated.
    #[error("Conflict on {entity}: {message}")]
    Conflict {
        /// The kind of record involved (e.g., "payslip").
        entity: String,
        /// A description of the conflict.
        message: String,
    },

    /// A record referenced by a write does not exist.
    #[error("Missing {entity}: {id}")]
    Missing {
        /// The kind of record involved.
        entity: String,
        /// The id that was not found.
        id: String,
    },

    /// The backend could not be reached or is in a failed state.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// A description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a conflict error.
    pub fn conflict(entity: &str, message: impl Into<String>) -> Self {
        StoreError::Conflict {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    /// Creates a missing-record error.
    pub fn missing(entity: &str, id: impl std::fmt::Display) -> Self {
        StoreError::Missing {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
