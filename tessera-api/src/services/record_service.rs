//! Record Service
//!
//! Sequences the store, cache and validator for each record operation.
//! The search index is not touched here; it is only rewritten by a rebuild.

use std::sync::Arc;

use chrono::Utc;
use tessera_core::{
    Actor, Page, PageRequest, Record, RecordInput, RecordValidator, TesseraError, TesseraResult,
};
use tessera_storage::{paginate, RecordCache, RecordStore};

/// Orchestrates record operations over injected collaborators.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn RecordCache>,
    validator: Arc<dyn RecordValidator>,
}

/// Collapse a failed fetch into `NotFound` for the caller.
///
/// Failures other than a missing row are logged before being collapsed.
fn fetch_failed(id: &str, err: TesseraError) -> TesseraError {
    if err.is_not_found() {
        tracing::info!(id, "record not found");
    } else {
        tracing::error!(id, error = %err, "fetch failed, reporting not found");
    }
    TesseraError::not_found(id)
}

impl RecordService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn RecordCache>,
        validator: Arc<dyn RecordValidator>,
    ) -> Self {
        Self {
            store,
            cache,
            validator,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn RecordCache> {
        &self.cache
    }

    fn validate(&self, candidate: &Record) -> TesseraResult<()> {
        self.validator.validate(candidate).map_err(|e| {
            tracing::info!(reason = %e, "validation failed");
            TesseraError::from(e)
        })
    }

    /// Validate and persist a new record.
    ///
    /// The cache is not populated; the first Get after a Create goes to the
    /// store.
    #[tracing::instrument(skip(self, input, actor), fields(actor = actor.as_str()))]
    pub async fn create(&self, input: &RecordInput, actor: &Actor) -> TesseraResult<Record> {
        tracing::debug!("create record");
        let candidate = Record::candidate(input, actor, Utc::now());
        self.validate(&candidate)?;
        self.store.create(&candidate).await
    }

    /// Read a record, cache first.
    ///
    /// On a miss the store result is written back to the cache before it is
    /// returned.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> TesseraResult<Record> {
        tracing::debug!("get record");
        if let Some(record) = self.cache.get(id).await {
            return Ok(record);
        }

        let record = self
            .store
            .fetch_by_id(id)
            .await
            .map_err(|e| fetch_failed(id, e))?;
        self.cache.set(id, record.clone()).await;
        Ok(record)
    }

    /// Replace a record's caller-supplied fields.
    ///
    /// Validation runs before any store access. The hold read supplies the
    /// creation provenance carried into the overwrite; the cache entry is
    /// invalidated only once the overwrite has succeeded. Nothing locks the
    /// id between the hold read and the overwrite, so two concurrent updates
    /// of one record both succeed and the later overwrite wins.
    #[tracing::instrument(skip(self, input, actor), fields(actor = actor.as_str()))]
    pub async fn update(
        &self,
        id: &str,
        input: &RecordInput,
        actor: &Actor,
    ) -> TesseraResult<Record> {
        tracing::debug!("update record");
        let candidate = Record::candidate(input, actor, Utc::now());
        self.validate(&candidate)?;

        let hold = self
            .store
            .fetch_by_id(id)
            .await
            .map_err(|e| fetch_failed(id, e))?;

        let candidate = candidate.with_provenance_of(&hold);
        let stored = self.store.overwrite_by_id(&candidate, id).await?;
        self.cache.invalidate(id).await;
        Ok(stored)
    }

    /// Soft-delete a record.
    ///
    /// The cache entry is left in place, so a record read before deletion
    /// stays readable through Get until it is evicted by an Update.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> TesseraResult<()> {
        tracing::debug!("delete record");
        self.store
            .fetch_by_id(id)
            .await
            .map_err(|e| fetch_failed(id, e))?;
        self.store.soft_delete_by_id(id).await
    }

    /// One page of active records.
    #[tracing::instrument(skip(self, request), fields(model = %request.model, page = request.page, limit = request.limit))]
    pub async fn list(&self, request: &PageRequest) -> TesseraResult<Page<Record>> {
        tracing::debug!("list records");
        paginate(self.store.as_ref(), request).await
    }
}
