//! In-memory record store.
//!
//! Thread-safe and counts calls per gateway operation, so tests can observe
//! whether a read was served from the cache or went to the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tessera_core::{
    new_record_id, Record, RecordFilter, RecordId, StorageError, TesseraError, TesseraResult,
    RECORD_MODEL,
};

use crate::{RecordStore, RecordStream};

/// Snapshot of how often each gateway operation was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub create: u64,
    pub fetch_by_id: u64,
    pub overwrite_by_id: u64,
    pub soft_delete_by_id: u64,
    pub scan_active: u64,
    pub count: u64,
    pub fetch_page: u64,
}

#[derive(Debug, Default)]
struct CallCounters {
    create: AtomicU64,
    fetch_by_id: AtomicU64,
    overwrite_by_id: AtomicU64,
    soft_delete_by_id: AtomicU64,
    scan_active: AtomicU64,
    count: AtomicU64,
    fetch_page: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// In-memory store keyed by record id.
///
/// Soft-deleted records stay in the map with `deleted_at` set.
#[derive(Debug, Clone)]
pub struct InMemoryRecordStore {
    collection: String,
    records: Arc<RwLock<HashMap<RecordId, Record>>>,
    calls: Arc<CallCounters>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Create an empty store for the default collection.
    pub fn new() -> Self {
        Self::for_collection(RECORD_MODEL)
    }

    pub fn for_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            records: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(CallCounters::default()),
        }
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            create: self.calls.create.load(Ordering::Relaxed),
            fetch_by_id: self.calls.fetch_by_id.load(Ordering::Relaxed),
            overwrite_by_id: self.calls.overwrite_by_id.load(Ordering::Relaxed),
            soft_delete_by_id: self.calls.soft_delete_by_id.load(Ordering::Relaxed),
            scan_active: self.calls.scan_active.load(Ordering::Relaxed),
            count: self.calls.count.load(Ordering::Relaxed),
            fetch_page: self.calls.fetch_page.load(Ordering::Relaxed),
        }
    }

    /// Look at a record regardless of its deletion marker.
    ///
    /// Not part of the gateway; used to check that deletes are logical.
    pub fn get_raw(&self, id: &str) -> TesseraResult<Option<Record>> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    /// Number of stored rows, deleted ones included.
    pub fn len(&self) -> TesseraResult<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> TesseraResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Active records matching `filter`, sorted by creation order.
    fn matching(&self, filter: &RecordFilter) -> TesseraResult<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut matching: Vec<Record> = records
            .values()
            .filter(|r| r.is_active() && filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn create(&self, record: &Record) -> TesseraResult<Record> {
        bump(&self.calls.create);
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;

        let id = new_record_id();
        if records.contains_key(&id) {
            return Err(StorageError::InsertFailed {
                reason: format!("id {} already exists", id),
            }
            .into());
        }

        let now = Utc::now();
        let stored = Record {
            id: id.clone(),
            name: record.name.clone(),
            created_by: record.created_by.clone(),
            created_at: now,
            updated_by: record.updated_by.clone(),
            updated_at: now,
            deleted_at: None,
        };
        records.insert(id, stored.clone());
        Ok(stored)
    }

    async fn fetch_by_id(&self, id: &str) -> TesseraResult<Record> {
        bump(&self.calls.fetch_by_id);
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        records
            .get(id)
            .filter(|r| r.is_active())
            .cloned()
            .ok_or_else(|| TesseraError::not_found(id))
    }

    async fn overwrite_by_id(&self, record: &Record, id: &str) -> TesseraResult<Record> {
        bump(&self.calls.overwrite_by_id);
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let existing = records
            .get_mut(id)
            .filter(|r| r.is_active())
            .ok_or_else(|| TesseraError::not_found(id))?;

        *existing = Record {
            id: id.to_string(),
            name: record.name.clone(),
            created_by: record.created_by.clone(),
            created_at: record.created_at,
            updated_by: record.updated_by.clone(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        Ok(existing.clone())
    }

    async fn soft_delete_by_id(&self, id: &str) -> TesseraResult<()> {
        bump(&self.calls.soft_delete_by_id);
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let existing = records
            .get_mut(id)
            .filter(|r| r.is_active())
            .ok_or_else(|| TesseraError::not_found(id))?;
        existing.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn scan_active(&self) -> TesseraResult<RecordStream> {
        bump(&self.calls.scan_active);
        let snapshot = self.matching(&RecordFilter::default())?;
        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn count(&self, filter: &RecordFilter) -> TesseraResult<i64> {
        bump(&self.calls.count);
        Ok(self.matching(filter)?.len() as i64)
    }

    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        offset: i64,
        limit: i64,
    ) -> TesseraResult<Vec<Record>> {
        bump(&self.calls.fetch_page);
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(self
            .matching(filter)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use tessera_core::{Actor, RecordInput};

    fn candidate(name: &str) -> Record {
        Record::candidate(&RecordInput::new(name), &Actor::new("alice"), Utc::now())
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_audit() -> TesseraResult<()> {
        let store = InMemoryRecordStore::new();
        let stored = store.create(&candidate("first")).await?;

        assert!(!stored.id.is_empty());
        assert_eq!(stored.name, "first");
        assert_eq!(stored.created_by, "alice");
        assert!(stored.deleted_at.is_none());
        assert_eq!(store.fetch_by_id(&stored.id).await?, stored);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store.fetch_by_id("nope").await;
        assert!(matches!(err, Err(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_overwrite_is_full_replace() -> TesseraResult<()> {
        let store = InMemoryRecordStore::new();
        let stored = store.create(&candidate("first")).await?;

        let replacement =
            Record::candidate(&RecordInput::new("second"), &Actor::new("bob"), Utc::now());
        let updated = store.overwrite_by_id(&replacement, &stored.id).await?;

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.name, "second");
        // No merge: creation provenance comes from the supplied record.
        assert_eq!(updated.created_by, "bob");
        assert_eq!(updated.created_at, replacement.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_overwrite_missing_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store.overwrite_by_id(&candidate("x"), "nope").await;
        assert!(matches!(err, Err(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_soft_delete_is_logical() -> TesseraResult<()> {
        let store = InMemoryRecordStore::new();
        let stored = store.create(&candidate("doomed")).await?;

        store.soft_delete_by_id(&stored.id).await?;

        assert!(store.fetch_by_id(&stored.id).await.is_err());
        let raw = store.get_raw(&stored.id)?;
        assert!(raw.is_some_and(|r| r.is_deleted()));
        assert_eq!(store.len()?, 1);

        let again = store.soft_delete_by_id(&stored.id).await;
        assert!(matches!(again, Err(ref e) if e.is_not_found()));
        Ok(())
    }

    #[tokio::test]
    async fn test_scan_and_count_skip_deleted() -> TesseraResult<()> {
        let store = InMemoryRecordStore::new();
        let keep = store.create(&candidate("keep")).await?;
        let gone = store.create(&candidate("gone")).await?;
        store.soft_delete_by_id(&gone.id).await?;

        let scanned: Vec<Record> = store.scan_active().await?.try_collect().await?;
        assert_eq!(scanned, vec![keep]);
        assert_eq!(store.count(&RecordFilter::default()).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_page_in_creation_order() -> TesseraResult<()> {
        let store = InMemoryRecordStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.create(&candidate(&format!("r{}", i))).await?.id);
        }

        let page = store.fetch_page(&RecordFilter::default(), 1, 2).await?;
        let page_ids: Vec<_> = page.into_iter().map(|r| r.id).collect();
        assert_eq!(page_ids, ids[1..3].to_vec());

        let filtered = store
            .fetch_page(&RecordFilter::by_name("r4"), 0, 10)
            .await?;
        assert_eq!(filtered.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_call_counters() -> TesseraResult<()> {
        let store = InMemoryRecordStore::new();
        let stored = store.create(&candidate("x")).await?;
        store.fetch_by_id(&stored.id).await?;
        store.fetch_by_id(&stored.id).await?;

        let calls = store.calls();
        assert_eq!(calls.create, 1);
        assert_eq!(calls.fetch_by_id, 2);
        assert_eq!(calls.overwrite_by_id, 0);
        Ok(())
    }
}
