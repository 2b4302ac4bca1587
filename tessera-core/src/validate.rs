//! Field-level validation of candidate records.

use crate::{Record, ValidationError};

/// Longest accepted record name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Domain rules a candidate must satisfy before it reaches the store.
pub trait RecordValidator: Send + Sync {
    /// Check `record`, returning the first rule it breaks.
    fn validate(&self, record: &Record) -> Result<(), ValidationError>;
}

/// Default rules: `name` is required and bounded in length.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameValidator;

impl RecordValidator for NameValidator {
    fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        if record.name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            });
        }
        let len = record.name.chars().count();
        if len > MAX_NAME_LENGTH {
            return Err(ValidationError::InvalidValue {
                field: "name".to_string(),
                reason: format!("must be at most {} characters, got {}", MAX_NAME_LENGTH, len),
            });
        }
        Ok(())
    }
}
