//! List filters for record queries.

use serde::{Deserialize, Serialize};

use crate::Record;

/// Optional predicate applied to list and count queries.
///
/// An empty filter matches every active record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring match on `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Exact match on `created_by`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl RecordFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            created_by: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.created_by.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(name) = &self.name {
            if !record.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(created_by) = &self.created_by {
            if &record.created_by != created_by {
                return false;
            }
        }
        true
    }
}
