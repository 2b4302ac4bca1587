//! Record REST API Routes
//!
//! Thin handlers over [`RecordService`]; every decision about cache and
//! store sequencing lives in the service.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tessera_core::{RecordInput, RecordView};

use crate::{
    error::{ApiError, ApiResult},
    extractors::ActorExtractor,
    services::RecordService,
    state::AppState,
    types::{ListRecordsQuery, ListRecordsResponse},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/todos - Create a new record
pub async fn create_record(
    State(records): State<Arc<RecordService>>,
    ActorExtractor(actor): ActorExtractor,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body.map_err(ApiError::from)?;
    let record = records.create(&input, &actor).await?;
    Ok((StatusCode::CREATED, Json(RecordView::from(record))))
}

/// GET /api/v1/todos - List records one page at a time
pub async fn list_records(
    State(records): State<Arc<RecordService>>,
    query: Result<Query<ListRecordsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(params) = query.map_err(ApiError::from)?;
    let page = records.list(&params.to_page_request()).await?;
    Ok(Json(ListRecordsResponse::from(page)))
}

/// GET /api/v1/todos/:id - Get a record by ID
pub async fn get_record(
    State(records): State<Arc<RecordService>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record = records.get(&id).await?;
    Ok(Json(RecordView::from(record)))
}

/// PUT /api/v1/todos/:id - Replace a record's fields
pub async fn update_record(
    State(records): State<Arc<RecordService>>,
    ActorExtractor(actor): ActorExtractor,
    Path(id): Path<String>,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body.map_err(ApiError::from)?;
    let record = records.update(&id, &input, &actor).await?;
    Ok(Json(RecordView::from(record)))
}

/// DELETE /api/v1/todos/:id - Soft-delete a record
pub async fn delete_record(
    State(records): State<Arc<RecordService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    records.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the record routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::post(create_record))
        .route("/", axum::routing::get(list_records))
        .route("/:id", axum::routing::get(get_record))
        .route("/:id", axum::routing::put(update_record))
        .route("/:id", axum::routing::delete(delete_record))
}
