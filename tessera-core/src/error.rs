//! Error types for Tessera operations

use thiserror::Error;

use crate::RecordId;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found: {id}")]
    NotFound { id: RecordId },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Update failed for {id}: {reason}")]
    UpdateFailed { id: RecordId, reason: String },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown model: {model}")]
    UnknownModel { model: String },
}

/// Search index errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("Failed to delete index {index}: {reason}")]
    DeleteFailed { index: String, reason: String },

    #[error("Failed to index document {id} into {index}: {reason}")]
    DocumentFailed {
        index: String,
        id: RecordId,
        reason: String,
    },

    #[error("Search backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Master error type for all Tessera errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TesseraError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

impl TesseraError {
    /// Shorthand for a not-found storage error.
    pub fn not_found(id: impl Into<RecordId>) -> Self {
        TesseraError::Storage(StorageError::NotFound { id: id.into() })
    }

    /// True when the referenced record has no active row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TesseraError::Storage(StorageError::NotFound { .. }))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TesseraError::Validation(_))
    }
}

/// Result type alias for Tessera operations.
pub type TesseraResult<T> = Result<T, TesseraError>;

// =============================================================================
// TESTS
// =============================================================================
