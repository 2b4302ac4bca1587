//! Tessera Storage - Record Store Gateway and Cache Layer
//!
//! Defines the storage abstraction the orchestrator talks to, an in-memory
//! implementation, the process-local record cache and the pagination engine.
//! The Postgres implementation lives in tessera-api.

pub mod cache;
pub mod memory;
pub mod paginate;

pub use cache::{CacheStats, InMemoryRecordCache, RecordCache};
pub use memory::{InMemoryRecordStore, StoreCalls};
pub use paginate::paginate;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use tessera_core::{Record, RecordFilter, TesseraResult};

/// Stream of active records produced by [`RecordStore::scan_active`].
pub type RecordStream = BoxStream<'static, TesseraResult<Record>>;

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Gateway to the durable record store.
///
/// Implementations provide atomic single-record create/fetch/overwrite and a
/// full scan. None of these methods touch the cache or the search index.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Collection this store serves (e.g. `"todo"`).
    fn collection(&self) -> &str;

    /// Persist a new record.
    ///
    /// The store assigns `id`, `created_at` and `updated_at`; the audit
    /// actors are taken from `record`. Returns the stored record.
    async fn create(&self, record: &Record) -> TesseraResult<Record>;

    /// Fetch an active record, failing with `NotFound` if it is missing or
    /// soft-deleted.
    async fn fetch_by_id(&self, id: &str) -> TesseraResult<Record>;

    /// Replace every field of the active record at `id` with `record`.
    ///
    /// This is a full-field replace, not a merge: the caller must carry the
    /// original `created_by`/`created_at` forward itself. The store stamps
    /// `updated_at`. Fails with `NotFound` when no active record exists.
    async fn overwrite_by_id(&self, record: &Record, id: &str) -> TesseraResult<Record>;

    /// Set the deletion marker; `NotFound` if missing or already deleted.
    async fn soft_delete_by_id(&self, id: &str) -> TesseraResult<()>;

    /// All non-deleted records. Unpaginated and potentially expensive.
    async fn scan_active(&self) -> TesseraResult<RecordStream>;

    /// Number of active records matching `filter`.
    async fn count(&self, filter: &RecordFilter) -> TesseraResult<i64>;

    /// Active records matching `filter`, in creation order, skipping
    /// `offset` and returning at most `limit`.
    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        offset: i64,
        limit: i64,
    ) -> TesseraResult<Vec<Record>>;
}
