/// Domain error type shared by all services
///
/// Every service operation returns `Result<T, ServiceError>`. Persistence
/// failures are translated at the service boundary: a "not found" becomes the
/// matching domain kind, a unique-constraint violation becomes the matching
/// duplicate kind, everything else becomes [`ServiceError::Internal`] with
/// context attached.
///
/// Authentication failures are deliberately undifferentiated: both an unknown
/// email and a wrong secret surface as [`ServiceError::InvalidCredentials`].
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::{jwt::JwtError, password::PasswordError, policy::PolicyError};
use crate::repository::RepositoryError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A single offending field reported by request validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error kinds produced by the identity core and domain services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed input
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// Email already registered (system-wide)
    #[error("Email already registered")]
    DuplicatedEmail,

    /// Project name already used by this owner
    #[error("Project name already exists")]
    DuplicatedProject,

    /// Holiday title already used by this owner
    #[error("Holiday title already exists")]
    DuplicatedHoliday,

    /// User lookup miss
    #[error("User not found")]
    NotFoundUser,

    /// Resource lookup miss
    #[error("Resource not found")]
    NotFound,

    /// Authentication failure
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Policy gate denial
    #[error("Access denied")]
    Forbidden,

    /// Invariant violation (e.g. deleting a manager)
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Worker ids that could not be resolved for this owner
    #[error("Unknown workers: {0:?}")]
    MissingWorkers(Vec<Uuid>),

    /// Infrastructure failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Wraps an infrastructure failure with context
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        ServiceError::Internal(format!("{}: {}", context, err))
    }

    /// Wraps a repository failure, keeping `NotFound` distinguishable
    pub fn from_repository(context: &str, err: RepositoryError, not_found: ServiceError) -> Self {
        match err {
            RepositoryError::NotFound => not_found,
            other => ServiceError::internal(context, other),
        }
    }
}

impl From<PolicyError> for ServiceError {
    fn from(_: PolicyError) -> Self {
        ServiceError::Forbidden
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::internal("Password operation failed", err)
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::internal("Session token operation failed", err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ServiceError::Validation(fields)
    }
}

/// Runs derive-based validation on a request
pub fn validate_request<T: Validate>(req: &T) -> ServiceResult<()> {
    req.validate().map_err(ServiceError::from)
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct SampleForm {
        #[validate(email(message = "Invalid email format"))]
        email: String,

        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_validation_lists_offending_fields() {
        let form = SampleForm {
            email: "not-an-email".to_string(),
            name: String::new(),
        };

        match validate_request(&form) {
            Err(ServiceError::Validation(fields)) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["email", "name"]);
                assert_eq!(fields[0].message, "Invalid email format");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let form = SampleForm {
            email: "a@x.com".to_string(),
            name: "Ann".to_string(),
        };
        assert!(validate_request(&form).is_ok());
    }

    #[test]
    fn test_repository_not_found_is_translated() {
        let err = ServiceError::from_repository("lookup", RepositoryError::NotFound, ServiceError::NotFoundUser);
        assert!(matches!(err, ServiceError::NotFoundUser));

        let err = ServiceError::from_repository(
            "lookup",
            RepositoryError::Unavailable("down".to_string()),
            ServiceError::NotFoundUser,
        );
        match err {
            ServiceError::Internal(msg) => assert!(msg.starts_with("lookup:")),
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_error_maps_to_forbidden() {
        let err: ServiceError = PolicyError::Forbidden {
            object: "*".to_string(),
            action: "*".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::Forbidden));
    }
}
