//! Full rebuild of the search index from the record store.

use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::json;
use tessera_core::RecordView;
use tessera_storage::RecordStore;
use tokio::sync::Mutex;

use crate::SearchIndex;

/// Counts from one rebuild pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Records written into the index.
    pub indexed: usize,
    /// Records the scan yielded as errors or the index refused.
    pub failed: usize,
    /// Whether dropping the old index failed (the rebuild carries on).
    pub delete_failed: bool,
    /// Whether the store scan could not be opened at all.
    pub scan_failed: bool,
}

impl RebuildReport {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "indexed": self.indexed,
            "failed": self.failed,
            "delete_failed": self.delete_failed,
            "scan_failed": self.scan_failed,
        })
    }
}

/// Result of asking for a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildOutcome {
    Completed(RebuildReport),
    /// Another rebuild held the guard; nothing was done.
    AlreadyRunning,
}

/// Rebuilds the search index for the store's collection.
///
/// This is the only code path that writes to the index. Rebuilds are
/// single-flight: an overlapping call returns immediately with
/// [`RebuildOutcome::AlreadyRunning`] instead of racing the
/// delete-then-reindex sequence. Mutations are not blocked while a rebuild
/// runs.
pub struct IndexSynchronizer {
    store: Arc<dyn RecordStore>,
    index: Arc<dyn SearchIndex>,
    running: Mutex<()>,
}

impl IndexSynchronizer {
    pub fn new(store: Arc<dyn RecordStore>, index: Arc<dyn SearchIndex>) -> Self {
        Self {
            store,
            index,
            running: Mutex::new(()),
        }
    }

    /// Drop the index, then index every active record one at a time.
    ///
    /// Failures are logged and skipped; one bad record never stops the
    /// remaining ones from being indexed.
    pub async fn rebuild(&self) -> RebuildOutcome {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("search index rebuild already in progress, skipping");
            return RebuildOutcome::AlreadyRunning;
        };

        let index_name = self.store.collection().to_string();
        let mut report = RebuildReport::default();
        tracing::info!(index = %index_name, "rebuilding search index");

        if let Err(e) = self.index.delete_index(&index_name).await {
            tracing::error!(index = %index_name, error = %e, "failed to delete search index");
            report.delete_failed = true;
        }

        let mut records = match self.store.scan_active().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(index = %index_name, error = %e, "failed to scan active records");
                report.scan_failed = true;
                return RebuildOutcome::Completed(report);
            }
        };

        while let Some(item) = records.next().await {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(index = %index_name, error = %e, "skipping unreadable record");
                    report.failed += 1;
                    continue;
                }
            };

            let document = RecordView::from(&record);
            match self
                .index
                .index_document(&index_name, &record.id, &document)
                .await
            {
                Ok(()) => report.indexed += 1,
                Err(e) => {
                    tracing::warn!(index = %index_name, id = %record.id, error = %e, "failed to index record");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            index = %index_name,
            indexed = report.indexed,
            failed = report.failed,
            "search index rebuild finished"
        );
        RebuildOutcome::Completed(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemorySearchIndex;
    use chrono::Utc;
    use tessera_core::{Actor, Record, RecordInput, TesseraResult};
    use tessera_storage::InMemoryRecordStore;

    async fn store_with(names: &[&str]) -> TesseraResult<Arc<InMemoryRecordStore>> {
        let store = Arc::new(InMemoryRecordStore::new());
        for name in names {
            let candidate = Record::candidate(&RecordInput::new(*name), &Actor::anonymous(), Utc::now());
            store.create(&candidate).await?;
        }
        Ok(store)
    }

    #[tokio::test]
    async fn test_rebuild_indexes_active_records() -> TesseraResult<()> {
        let store = store_with(&["a", "b", "c"]).await?;
        let index = Arc::new(InMemorySearchIndex::new());
        let sync = IndexSynchronizer::new(store.clone(), index.clone());

        let outcome = sync.rebuild().await;
        assert_eq!(
            outcome,
            RebuildOutcome::Completed(RebuildReport {
                indexed: 3,
                ..Default::default()
            })
        );
        assert_eq!(index.documents("todo")?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_contents() -> TesseraResult<()> {
        let store = store_with(&["a"]).await?;
        let index = Arc::new(InMemorySearchIndex::new());
        let stale = RecordView::from(Record::candidate(
            &RecordInput::new("ghost"),
            &Actor::anonymous(),
            Utc::now(),
        ));
        index.index_document("todo", "ghost", &stale).await?;

        IndexSynchronizer::new(store, index.clone()).rebuild().await;

        assert!(index.document("todo", "ghost")?.is_none());
        assert_eq!(index.documents("todo")?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_overlapping_rebuild_is_skipped() -> TesseraResult<()> {
        let store = store_with(&["a"]).await?;
        let index = Arc::new(InMemorySearchIndex::new());
        let sync = IndexSynchronizer::new(store, index);

        let _held = sync.running.lock().await;
        assert_eq!(sync.rebuild().await, RebuildOutcome::AlreadyRunning);
        Ok(())
    }

    #[test]
    fn test_report_json() {
        let report = RebuildReport {
            indexed: 2,
            failed: 1,
            ..Default::default()
        };
        let json = report.to_json();
        assert_eq!(json["indexed"], 2);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["scan_failed"], false);
    }
}
