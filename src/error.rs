use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::types::ParseRoleError;

/// Errors surfaced to callers of the authorization engine.
///
/// Each variant implies a different client remediation, so call sites should
/// match on the kind rather than on the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No resolvable identity for the request.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Malformed identifier or out-of-enum role value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identity resolved, but lacks the required role for the action.
    #[error("Unauthorized: insufficient role for this organization")]
    Unauthorized,

    /// The identity or target is not a member of the organization.
    #[error("User is not a member of this organization")]
    NotAMember,

    /// The user already has a role in the organization.
    #[error("User is already a member of this organization")]
    AlreadyMember,

    /// An organization with the same details already exists.
    #[error("Organization already exists")]
    DuplicateOrganization,

    /// Store or transaction failure unrelated to authorization.
    #[error("Internal server error")]
    Internal,
}

impl AuthzError {
    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::NotAMember => StatusCode::NOT_FOUND,
            Self::AlreadyMember | Self::DuplicateOrganization => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidInput(_) => "invalid_input",
            Self::Unauthorized => "forbidden",
            Self::NotAMember => "not_a_member",
            Self::AlreadyMember => "already_member",
            Self::DuplicateOrganization => "duplicate_organization",
            Self::Internal => "internal",
        }
    }
}

/// Error body returned to clients.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<ParseRoleError> for AuthzError {
    fn from(err: ParseRoleError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Errors raised by store implementations.
///
/// Never returned to callers of the services; translated at the service
/// boundary into [`AuthzError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The row targeted by an update does not exist.
    #[error("Record not found")]
    NotFound,

    /// Connection, query or transaction failure.
    #[error("Storage error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                StoreError::UniqueViolation(detail)
            }
            _ => match &err {
                sea_orm::DbErr::Conn(inner) => {
                    StoreError::Backend(format!("Connection error: {}", inner))
                }
                sea_orm::DbErr::Query(inner) => {
                    StoreError::Backend(format!("Query error: {}", inner))
                }
                sea_orm::DbErr::Exec(inner) => {
                    StoreError::Backend(format!("Execution error: {}", inner))
                }
                _ => StoreError::Backend(format!("Database error: {}", err)),
            },
        }
    }
}
