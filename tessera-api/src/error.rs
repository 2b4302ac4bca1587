//! API error type and its HTTP mapping.
//!
//! Every failure leaves a handler as an [`ApiError`], serialized as
//! `{code, message, details?}` with the status its [`ErrorCode`] maps to.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tessera_core::{StorageError, TesseraError};

/// Client-visible error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record failed validation (400)
    ValidationFailed,
    /// Body or query could not be parsed (400)
    InvalidInput,
    /// No active record with the requested id (404)
    RecordNotFound,
    /// A rebuild already holds the guard (409)
    StateConflict,
    /// Search backend refused a request (502)
    SearchError,
    /// Store failure; detail is logged, not returned (500)
    DatabaseError,
    /// Startup or serving failure (500)
    InternalError,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::RecordNotFound => StatusCode::NOT_FOUND,
            ErrorCode::StateConflict => StatusCode::CONFLICT,
            ErrorCode::SearchError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::RecordNotFound => "Record not found",
            ErrorCode::StateConflict => "Operation conflicts with current state",
            ErrorCode::SearchError => "Search backend operation failed",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error body returned by every handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Error carrying the code's default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn record_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::RecordNotFound,
            format!("Data with ID '{}' not found", id),
        )
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Validation reasons are surfaced verbatim. Store and index failures get
/// an opaque message; the detail only goes to the log.
impl From<TesseraError> for ApiError {
    fn from(err: TesseraError) -> Self {
        match err {
            TesseraError::Validation(e) => ApiError::validation_failed(e.to_string()),
            TesseraError::Storage(StorageError::NotFound { id }) => ApiError::record_not_found(id),
            TesseraError::Storage(e) => {
                tracing::error!(error = %e, "store operation failed");
                ApiError::from_code(ErrorCode::DatabaseError)
            }
            TesseraError::Index(e) => {
                tracing::error!(error = %e, "search index operation failed");
                ApiError::from_code(ErrorCode::SearchError)
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_input("Invalid query parameters")
            .with_details(json!({ "reason": rejection.body_text() }))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input("Invalid JSON body")
            .with_details(json!({ "reason": rejection.body_text() }))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
