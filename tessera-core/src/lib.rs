//! Tessera Core - Record Types
//!
//! Data model, pagination arithmetic, validation rules and the error
//! taxonomy shared by every other crate. Nothing here performs I/O.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod error;
pub mod filter;
pub mod pagination;
pub mod record;
pub mod validate;

pub use error::{IndexError, StorageError, TesseraError, TesseraResult, ValidationError};
pub use filter::RecordFilter;
pub use pagination::{normalize, Page, PageMetadata, PageRequest, DEFAULT_PAGE_LIMIT};
pub use record::{Actor, Record, RecordInput, RecordView, ANONYMOUS_ACTOR, RECORD_MODEL};
pub use validate::{NameValidator, RecordValidator, MAX_NAME_LENGTH};

/// Opaque record identifier assigned by the store.
pub type RecordId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new record id.
///
/// UUIDv7 embeds a Unix timestamp, so ids sort by creation time.
pub fn new_record_id() -> RecordId {
    Uuid::now_v7().to_string()
}
