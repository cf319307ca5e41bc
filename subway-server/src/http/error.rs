//! API error types with IntoResponse
//!
//! Every error body has the same shape: `{"message": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use subway_core::{SectionError, ValidationError};

use crate::db::DbError;
use crate::service::ServiceError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Section or topology rule violated (400)
    Section(SectionError),

    /// Request refused for a reason the caller can fix (400)
    BadRequest { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Section(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{} '{}' not found", resource, id),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(e) => Self::Validation(e),
            ServiceError::Section(e) => Self::Section(e),
            ServiceError::NotFound { resource, id } => Self::NotFound { resource, id },
            e @ (ServiceError::Duplicate { .. } | ServiceError::StationInUse { .. }) => {
                Self::BadRequest {
                    message: e.to_string(),
                }
            }
            ServiceError::Db(e) => Self::Database(e),
        }
    }
}
