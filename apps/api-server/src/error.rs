//! # Error Types for the POS API
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbError / CoreError / FieldErrors                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError  ← returned by every service method                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError      ← status code + JSON body, mapped here and nowhere else  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use pos_core::{CoreError, FieldError, FieldErrors, Status};
use pos_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Errors raised by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Status change to the value the entity already has.
    #[error("{entity} {id} is already {status}")]
    DuplicateStatus {
        entity: &'static str,
        id: String,
        status: Status,
    },

    #[error("{0}")]
    BadRequest(String),

    /// Uploaded file is not a readable CSV of products.
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// PDF or Excel rendering failed.
    #[error("Export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(err) => {
                let mut errors = FieldErrors::new();
                errors.push(err);
                ServiceError::Validation(errors)
            }
            CoreError::InvalidAmount { .. } => ServiceError::InvalidFormat(err.to_string()),
            CoreError::MissingReportCriteria
            | CoreError::UnknownRevenuePeriod(_)
            | CoreError::AmountOverflow(_) => {
                ServiceError::BadRequest(err.to_string())
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// HTTP Error
// =============================================================================

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Error code for programmatic handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
    /// Failing fields of a validation error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorBody {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        ErrorBody {
            code,
            message: message.into(),
            errors: None,
        }
    }
}

/// Error type returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unknown `X-API-KEY`
    Unauthorized(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Service(ServiceError::Validation(errors))
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Service(ServiceError::Db(err))
    }
}

impl ApiError {
    /// Status code and body for this error.
    pub fn parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new("UNAUTHORIZED", msg))
            }
            ApiError::Service(err) => service_parts(err),
        }
    }
}

fn service_parts(err: &ServiceError) -> (StatusCode, ErrorBody) {
    match err {
        ServiceError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, ErrorBody::new("NOT_FOUND", err.to_string()))
        }
        ServiceError::DuplicateStatus { .. } => (
            StatusCode::CONFLICT,
            ErrorBody::new("DUPLICATE_STATUS", err.to_string()),
        ),
        ServiceError::BadRequest(msg) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg))
        }
        ServiceError::InvalidFormat(_) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("INVALID_FORMAT", err.to_string()),
        ),
        ServiceError::Validation(errors) => {
            let mut body = ErrorBody::new("VALIDATION_FAILED", err.to_string());
            body.errors = Some(errors.0.clone());
            (StatusCode::BAD_REQUEST, body)
        }
        ServiceError::Export(detail) => {
            error!(detail = %detail, "Export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("EXPORT_FAILED", "Could not render the export"),
            )
        }
        ServiceError::Db(db) => db_parts(db),
    }
}

fn db_parts(err: &DbError) -> (StatusCode, ErrorBody) {
    match err {
        DbError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, ErrorBody::new("NOT_FOUND", err.to_string()))
        }
        DbError::UniqueViolation { .. } => {
            (StatusCode::CONFLICT, ErrorBody::new("DUPLICATE", err.to_string()))
        }
        DbError::ForeignKeyViolation { .. } | DbError::InsufficientStock { .. } => {
            (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", err.to_string()))
        }
        _ => {
            // Internal details stay in the log
            error!(error = %err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("INTERNAL_ERROR", "Internal server error"),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        if status.is_client_error() {
            warn!(status = status.as_u16(), code = body.code, message = %body.message, "Request rejected");
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
