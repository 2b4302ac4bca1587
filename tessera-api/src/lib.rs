//! Tessera API - Consistency Orchestrator and REST Layer
//!
//! Wires the record store, cache, validator and search synchronizer
//! together behind [`RecordService`] and exposes them over Axum. The
//! Postgres-backed store and its connection pool live here too.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, SearchConfig, StoreKind};
pub use db::{DbConfig, PgRecordStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extractors::{ActorExtractor, USER_ID_HEADER};
pub use routes::create_api_router;
pub use services::RecordService;
pub use state::AppState;
pub use types::{ListRecordsQuery, ListRecordsResponse};
