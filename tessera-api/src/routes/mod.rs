//! REST API Routes Module
//!
//! Composes the record, admin and health routers into one application.
//!
//! # Routes
//! - `/api/v1/todos` - record CRUD and paginated listing
//! - `/api/v1/admin/repopulate` - search index rebuild (optional)
//! - `/health` - liveness

pub mod admin;
pub mod health;
pub mod record;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Build the complete application router.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let mut api_routes = Router::new().nest("/todos", record::create_router());
    if config.admin_repopulate {
        api_routes = api_routes.nest("/admin", admin::create_router());
    }

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
