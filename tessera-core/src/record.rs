//! The managed record and its wire-facing shapes.

use serde::{Deserialize, Serialize};

use crate::{RecordId, Timestamp};

/// Collection name records are stored and indexed under.
pub const RECORD_MODEL: &str = "todo";

/// User id recorded when a request carries no identity.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Identity a mutation is performed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor(String);

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_ACTOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// A stored record with its audit metadata.
///
/// `id` is assigned by the store on creation and never changes afterwards.
/// `created_by`/`created_at` are fixed at creation; a record with
/// `deleted_at` set is logically deleted but still physically present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub created_by: String,
    pub created_at: Timestamp,
    pub updated_by: String,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Record {
    /// Build an unsaved candidate from caller input.
    ///
    /// The id is left empty for the store to assign. Both audit pairs are
    /// stamped with `actor` and `now`; Update replaces the creation pair
    /// with the values held in the store.
    pub fn candidate(input: &RecordInput, actor: &Actor, now: Timestamp) -> Self {
        Self {
            id: RecordId::new(),
            name: input.name.clone(),
            created_by: actor.as_str().to_string(),
            created_at: now,
            updated_by: actor.as_str().to_string(),
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted()
    }

    /// Copy creation provenance from a previously stored version.
    pub fn with_provenance_of(mut self, held: &Record) -> Self {
        self.created_by = held.created_by.clone();
        self.created_at = held.created_at;
        self
    }
}

/// Caller-supplied fields for Create and Update.
///
/// A missing `name` deserializes as empty and is rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordInput {
    pub name: String,
}

impl RecordInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Record as returned to callers and written into the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: RecordId,
    pub name: String,
    pub created_by: String,
    pub created_at: Timestamp,
    pub updated_by: String,
    pub updated_at: Timestamp,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            created_by: record.created_by.clone(),
            created_at: record.created_at,
            updated_by: record.updated_by.clone(),
            updated_at: record.updated_at,
        }
    }
}

impl From<Record> for RecordView {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            name: record.name,
            created_by: record.created_by,
            created_at: record.created_at,
            updated_by: record.updated_by,
            updated_at: record.updated_at,
        }
    }
}
