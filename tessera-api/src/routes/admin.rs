//! Operator routes.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tessera_search::{IndexSynchronizer, RebuildOutcome};

use crate::{error::ApiError, state::AppState};

/// POST /api/v1/admin/repopulate - Rebuild the search index from the store
///
/// Runs the rebuild to completion and answers 202 with its report, or 409
/// when another rebuild holds the guard.
pub async fn repopulate(State(sync): State<Arc<IndexSynchronizer>>) -> impl IntoResponse {
    match sync.rebuild().await {
        RebuildOutcome::Completed(report) => {
            (StatusCode::ACCEPTED, Json(report.to_json())).into_response()
        }
        RebuildOutcome::AlreadyRunning => {
            ApiError::state_conflict("Search index rebuild already in progress").into_response()
        }
    }
}

pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new().route("/repopulate", axum::routing::post(repopulate))
}
