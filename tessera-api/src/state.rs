//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use tessera_search::IndexSynchronizer;

use crate::services::RecordService;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator for record CRUD.
    pub records: Arc<RecordService>,
    /// Search index rebuilds.
    pub sync: Arc<IndexSynchronizer>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(records: Arc<RecordService>, sync: Arc<IndexSynchronizer>) -> Self {
        Self {
            records,
            sync,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<RecordService>, records);
crate::impl_from_ref!(Arc<IndexSynchronizer>, sync);
crate::impl_from_ref!(Instant, start_time);
