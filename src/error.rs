// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;
use crate::filter::FilterError;
use crate::services::error::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidSortParameter(String),
    InvalidEntity(String),
    InvalidParams(String),
    InvalidBodyFormat(String),
    InvalidPagination(String),

    // 404 Not Found
    ResourceNotFound(String),
    EntityNotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict
    EntityAlreadyExists(String),

    // 415 Unsupported Media Type
    InvalidMediaType(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidSortParameter(_)
            | ApiError::InvalidEntity(_)
            | ApiError::InvalidParams(_)
            | ApiError::InvalidBodyFormat(_)
            | ApiError::InvalidPagination(_) => 400,
            ApiError::ResourceNotFound(_) | ApiError::EntityNotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::EntityAlreadyExists(_) => 409,
            ApiError::InvalidMediaType(_) => 415,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidSortParameter(msg)
            | ApiError::InvalidEntity(msg)
            | ApiError::InvalidParams(msg)
            | ApiError::InvalidBodyFormat(msg)
            | ApiError::InvalidPagination(msg)
            | ApiError::ResourceNotFound(msg)
            | ApiError::EntityNotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::EntityAlreadyExists(msg)
            | ApiError::InvalidMediaType(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidSortParameter(_) => "INVALID_SORT_PARAMETER",
            ApiError::InvalidEntity(_) => "INVALID_ENTITY",
            ApiError::InvalidParams(_) => "INVALID_PARAMS",
            ApiError::InvalidBodyFormat(_) => "INVALID_BODY_FORMAT",
            ApiError::InvalidPagination(_) => "INVALID_PAGINATION",
            ApiError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            ApiError::EntityNotFound(_) => "ENTITY_NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::EntityAlreadyExists(_) => "ENTITY_ALREADY_EXISTS",
            ApiError::InvalidMediaType(_) => "INVALID_MEDIA_TYPE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Numeric code: HTTP status followed by a two-digit discriminator
    pub fn numeric_code(&self) -> u32 {
        match self {
            ApiError::InvalidSortParameter(_) => 40001,
            ApiError::InvalidEntity(_) => 40002,
            ApiError::InvalidParams(_) => 40003,
            ApiError::InvalidBodyFormat(_) => 40004,
            ApiError::InvalidPagination(_) => 40005,
            ApiError::ResourceNotFound(_) => 40401,
            ApiError::EntityNotFound(_) => 40402,
            ApiError::MethodNotAllowed(_) => 40501,
            ApiError::EntityAlreadyExists(_) => 40901,
            ApiError::InvalidMediaType(_) => 41501,
            ApiError::InternalServerError(_) => 50001,
            ApiError::ServiceUnavailable(_) => 50301,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code(),
            "error_code": self.numeric_code()
        })
    }
}

impl ApiError {
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        ApiError::ResourceNotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => ApiError::EntityNotFound(err.to_string()),
            ServiceError::AlreadyExists { .. } => ApiError::EntityAlreadyExists(err.to_string()),
            ServiceError::InvalidEntity { .. } => ApiError::InvalidEntity(err.to_string()),
            ServiceError::InvalidSort(e) => e.into(),
            ServiceError::InvalidPagination(_) => ApiError::InvalidPagination(err.to_string()),
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidSortParameter(_) => ApiError::InvalidSortParameter(err.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::EntityNotFound(format!("Not found: {}", msg)),
            DatabaseError::UniqueViolation(_) => {
                ApiError::EntityAlreadyExists("Entity already exists".to_string())
            }
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Missing database configuration: {}", name);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::MigrationError(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::InvalidMediaType("Expected request with `Content-Type: application/json`".to_string())
            }
            other => ApiError::InvalidBodyFormat(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidParams(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
