//! Tessera Search - Denormalised Search Index
//!
//! The search index is a separately queryable copy of active records. It is
//! only ever written by a full rebuild ([`IndexSynchronizer::rebuild`]);
//! creates, updates and deletes do not touch it, so it is fresh right after
//! a rebuild and may drift from the store until the next one.

pub mod elastic;
pub mod memory;
pub mod sync;

pub use elastic::ElasticsearchIndex;
pub use memory::InMemorySearchIndex;
pub use sync::{IndexSynchronizer, RebuildOutcome, RebuildReport};

use async_trait::async_trait;
use tessera_core::{RecordView, TesseraResult};

/// Destination index for record documents.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Drop `index` with all of its documents. Absence is not an error.
    async fn delete_index(&self, index: &str) -> TesseraResult<()>;

    /// Write one document into `index`, keyed by the record's store id.
    async fn index_document(&self, index: &str, id: &str, document: &RecordView)
        -> TesseraResult<()>;
}
