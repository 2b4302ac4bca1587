//! Tessera Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for record input and page requests
//! - Fixtures for seeded stores
//! - Collaborator doubles that fail on demand

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use proptest::prelude::*;

// Re-export core types for convenience
pub use tessera_core::{
    Actor, Page, PageMetadata, PageRequest, Record, RecordFilter, RecordInput, RecordView,
    StorageError, TesseraError, TesseraResult, DEFAULT_PAGE_LIMIT, RECORD_MODEL,
};
pub use tessera_search::{InMemorySearchIndex, SearchIndex};
pub use tessera_storage::{
    InMemoryRecordCache, InMemoryRecordStore, RecordCache, RecordStore, RecordStream, StoreCalls,
};

// ============================================================================
// FIXTURES
// ============================================================================

/// Actor used for mutations in tests.
pub fn test_actor() -> Actor {
    Actor::new("test-user")
}

/// Unsaved candidate with the given name.
pub fn candidate(name: &str) -> Record {
    Record::candidate(&RecordInput::new(name), &test_actor(), Utc::now())
}

/// Store holding `n` active records named `record 0` .. `record {n-1}`,
/// created in that order.
pub async fn seeded_store(n: usize) -> TesseraResult<Arc<InMemoryRecordStore>> {
    let store = Arc::new(InMemoryRecordStore::new());
    for i in 0..n {
        store.create(&candidate(&format!("record {}", i))).await?;
    }
    Ok(store)
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// Names the default validator accepts.
pub fn record_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{3,10}-[0-9]{1,5}",
        "[A-Z][a-z]{3,15} [a-z]{3,15}( [a-z]{3,15})?",
        Just("A".to_string()),
        "[a-z]{1}[a-z ]{50,120}[a-z]{1}",
    ]
}

/// Names the default validator rejects.
pub fn invalid_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \t]{1,8}",
        "[a-z]{256,300}",
    ]
}

/// Page requests including non-positive page and limit values.
pub fn page_request_strategy() -> impl Strategy<Value = PageRequest> {
    (-5i64..60, -5i64..60).prop_map(|(page, limit)| PageRequest::new(RECORD_MODEL, page, limit))
}

// ============================================================================
// FAILING DOUBLES
// ============================================================================

/// Search index that refuses selected documents.
#[derive(Debug, Default)]
pub struct FailingSearchIndex {
    /// Where accepted documents go.
    pub inner: InMemorySearchIndex,
    fail_ids: HashSet<String>,
    fail_delete: bool,
}

impl FailingSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse documents with any of these record ids.
    pub fn failing_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fail_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Make `delete_index` fail.
    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }
}

#[async_trait]
impl SearchIndex for FailingSearchIndex {
    async fn delete_index(&self, index: &str) -> TesseraResult<()> {
        if self.fail_delete {
            return Err(tessera_core::IndexError::DeleteFailed {
                index: index.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        self.inner.delete_index(index).await
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &RecordView,
    ) -> TesseraResult<()> {
        if self.fail_ids.contains(id) {
            return Err(tessera_core::IndexError::DocumentFailed {
                index: index.to_string(),
                id: id.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        self.inner.index_document(index, id, document).await
    }
}

/// Store whose every call fails with a backend error.
#[derive(Debug, Clone, Default)]
pub struct FailingRecordStore;

fn backend_down() -> TesseraError {
    StorageError::Backend {
        reason: "connection refused".to_string(),
    }
    .into()
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    fn collection(&self) -> &str {
        RECORD_MODEL
    }

    async fn create(&self, _record: &Record) -> TesseraResult<Record> {
        Err(backend_down())
    }

    async fn fetch_by_id(&self, _id: &str) -> TesseraResult<Record> {
        Err(backend_down())
    }

    async fn overwrite_by_id(&self, _record: &Record, _id: &str) -> TesseraResult<Record> {
        Err(backend_down())
    }

    async fn soft_delete_by_id(&self, _id: &str) -> TesseraResult<()> {
        Err(backend_down())
    }

    async fn scan_active(&self) -> TesseraResult<RecordStream> {
        Err(backend_down())
    }

    async fn count(&self, _filter: &RecordFilter) -> TesseraResult<i64> {
        Err(backend_down())
    }

    async fn fetch_page(
        &self,
        _filter: &RecordFilter,
        _offset: i64,
        _limit: i64,
    ) -> TesseraResult<Vec<Record>> {
        Err(backend_down())
    }
}
