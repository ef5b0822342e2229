/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`, which converts into the matching
/// HTTP status and a JSON body:
///
/// ```json
/// { "error": "conflict", "message": "Email already registered" }
/// ```
///
/// Domain errors convert through `From<ServiceError>`, so handlers can use `?`
/// on service calls directly.
///
/// # Example
///
/// ```
/// use taskhive_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("Project not found".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskhive_shared::error::{FieldError, ServiceError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unprocessable entity (422) - unknown worker ids
    UnknownWorkers(Vec<uuid::Uuid>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl From<FieldError> for ValidationErrorDetail {
    fn from(err: FieldError) -> Self {
        Self {
            field: err.field,
            message: err.message,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::UnknownWorkers(ids) => write!(f, "Unknown workers: {} ids", ids.len()),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::UnknownWorkers(ids) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unknown_workers",
                "Some workers do not exist".to_string(),
                Some(
                    ids.into_iter()
                        .map(|id| ValidationErrorDetail {
                            field: "dev_ids".to_string(),
                            message: id.to_string(),
                        })
                        .collect(),
                ),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert domain errors to API errors
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(fields) => {
                ApiError::ValidationError(fields.into_iter().map(Into::into).collect())
            }
            ServiceError::DuplicatedEmail
            | ServiceError::DuplicatedProject
            | ServiceError::DuplicatedHoliday => ApiError::Conflict(err.to_string()),
            ServiceError::NotFoundUser | ServiceError::NotFound => {
                ApiError::NotFound(err.to_string())
            }
            ServiceError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            ServiceError::Forbidden => ApiError::Forbidden("Access denied".to_string()),
            ServiceError::InvalidAction(msg) => ApiError::Forbidden(msg),
            ServiceError::MissingWorkers(ids) => ApiError::UnknownWorkers(ids),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: ServiceError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_service_error_status_mapping() {
        assert_eq!(
            status_of(ServiceError::Validation(vec![FieldError::new("email", "bad")])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(ServiceError::DuplicatedEmail), StatusCode::CONFLICT);
        assert_eq!(status_of(ServiceError::DuplicatedProject), StatusCode::CONFLICT);
        assert_eq!(status_of(ServiceError::DuplicatedHoliday), StatusCode::CONFLICT);
        assert_eq!(status_of(ServiceError::NotFoundUser), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServiceError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServiceError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ServiceError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ServiceError::InvalidAction("no".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::MissingWorkers(vec![Uuid::new_v4()])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ServiceError::Internal("db down".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = ApiError::from(ServiceError::Internal("password_hash leaked".to_string())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.error, "internal_error");
        assert_eq!(body.message, "An internal error occurred");
    }

    #[test]
    fn test_validation_details_carry_fields() {
        match ApiError::from(ServiceError::Validation(vec![FieldError::new("email", "Invalid email format")])) {
            ApiError::ValidationError(details) => {
                assert_eq!(details[0].field, "email");
                assert_eq!(details[0].message, "Invalid email format");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
