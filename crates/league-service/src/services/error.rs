//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use league_common::AppError;
use league_core::{DomainError, ErrorKind};
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Application error (auth, configuration)
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Caller lacks membership or role
    PermissionDenied { reason: String },

    /// Operation is illegal in the current state
    FailedPrecondition(String),

    /// Validation error
    Validation(String),

    /// Concurrent race lost
    Conflict(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::PermissionDenied { reason } => write!(f, "Permission denied: {reason}"),
            Self::FailedPrecondition(msg) => write!(f, "Failed precondition: {msg}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Create a failed precondition error
    pub fn failed_precondition(msg: impl Into<String>) -> Self {
        Self::FailedPrecondition(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Coarse classification shared with the domain layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => e.kind(),
            Self::App(e) => match e {
                AppError::Domain(e) => e.kind(),
                AppError::Validation(_) => ErrorKind::Validation,
                AppError::NotFound(_) => ErrorKind::NotFound,
                _ => ErrorKind::Internal,
            },
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::Forbidden,
            Self::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        if let Self::App(e) = self {
            return e.status_code();
        }
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::FailedPrecondition => 422,
            ErrorKind::Conflict => 409,
            ErrorKind::Validation => 400,
            ErrorKind::Internal => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied { .. } => "FORBIDDEN",
            Self::FailedPrecondition(_) => "FAILED_PRECONDITION",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The domain error behind this one, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) | Self::App(AppError::Domain(e)) => Some(e),
            _ => None,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {err}"))
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::{MemberRole, RoundStatus, Snowflake};

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Round", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("Round not found: 123"));
    }

    #[test]
    fn test_domain_kinds_map_to_status() {
        let cases = [
            (DomainError::LeagueNotFound(Snowflake::new(1)), 404),
            (
                DomainError::InsufficientRole {
                    required: MemberRole::Admin,
                },
                403,
            ),
            (DomainError::UserBanned, 403),
            (
                DomainError::IllegalTransition {
                    from: RoundStatus::Draft,
                    to: RoundStatus::Voting,
                },
                422,
            ),
            (DomainError::InviteExhausted, 422),
            (DomainError::ConcurrentModification("round".into()), 409),
            (DomainError::InvalidVote("points".into()), 400),
            (DomainError::DatabaseError("down".into()), 500),
        ];

        for (domain, status) in cases {
            let err = ServiceError::from(domain);
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_failed_precondition_error() {
        let err = ServiceError::failed_precondition("round is archived");
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "FAILED_PRECONDITION");
    }

    #[test]
    fn test_app_error_keeps_its_status() {
        let err = ServiceError::from(AppError::InvalidToken);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_as_domain() {
        let err = ServiceError::from(DomainError::SelfVote);
        assert!(matches!(err.as_domain(), Some(DomainError::SelfVote)));
        assert!(ServiceError::internal("x").as_domain().is_none());
    }
}
