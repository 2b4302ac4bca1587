//! Health Check Endpoints
//!
//! - /health - liveness with version and uptime
//! - /health/ping - plain liveness
//!
//! Neither touches the store.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

/// GET /health
pub async fn health(State(start_time): State<Instant>) -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Ok,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
    })
}

/// GET /health/ping
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/ping", get(ping))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() -> Result<(), serde_json::Error> {
        let response = HealthResponse {
            status: HealthStatus::Ok,
            version: "0.1.0".to_string(),
            uptime_seconds: 3,
        };
        let json = serde_json::to_string(&response)?;
        assert!(json.contains("\"status\":\"ok\""));
        Ok(())
    }
}
