//! Core records and value types.
//!
//! Organizations, users and memberships are plain data owned by the store.
//! [`Role`] is the closed set of roles a user can hold inside one organization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role held by a user inside a single organization.
///
/// # Example
///
/// ```rust
/// use orgauth::Role;
///
/// let role: Role = "admin".parse().unwrap();
/// assert!(role.is_admin());
/// assert!("owner".parse::<Role>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May mutate membership within its organization.
    Admin,
    /// May read organization and membership data.
    #[default]
    Member,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Check if this is the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Error returned when parsing a role string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: '{invalid_value}' (expected: admin or member)")]
pub struct ParseRoleError {
    invalid_value: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(ParseRoleError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved internal user for the current request.
///
/// Created once per request by the identity resolver and carried in the
/// request's extensions. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    user_id: String,
}

impl Identity {
    /// Create an identity for an internal user id.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// The internal user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Organization record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Store-assigned identifier (UUID).
    pub id: String,
    /// Display name (unique).
    pub name: String,
    /// User who created the organization and became its first admin.
    pub created_by: String,
    /// Creation timestamp (Unix seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix seconds).
    pub updated_at: u64,
}

/// User record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier (UUID).
    pub id: String,
    /// Display name.
    pub username: String,
    /// Email address (unique).
    pub email: String,
    /// Federated login subject linked to this user, if any.
    pub external_id: Option<String>,
    /// Creation timestamp (Unix seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix seconds).
    pub updated_at: u64,
}

/// A role-bearing relationship between one user and one organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Organization ID.
    pub org_id: String,
    /// User ID.
    pub user_id: String,
    /// Role in the organization.
    pub role: Role,
    /// Creation timestamp (Unix seconds).
    pub created_at: u64,
}

/// A membership joined with the member's display fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberWithUser {
    #[serde(flatten)]
    pub membership: Membership,
    pub username: String,
    pub email: String,
}

/// Parameters for creating a user during identity resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    /// Federated login subject.
    pub external_id: String,
    /// Email from the verified credential.
    pub email: String,
    /// Display name for a newly created user.
    pub username: String,
}

/// Result of an access decision.
///
/// Computed fresh from the store on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The identity holds a role that satisfies the requirement.
    Authorized(Role),
    /// The identity is a member, but its role does not satisfy the requirement.
    InsufficientRole(Role),
    /// The identity holds no membership in the organization.
    NotAMember,
    /// The organization or user id is malformed.
    InvalidInput,
    /// The membership could not be read.
    LookupFailed,
}

impl AccessOutcome {
    /// Check if access was granted.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    /// The role found in the store, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Authorized(role) | Self::InsufficientRole(role) => Some(*role),
            _ => None,
        }
    }
}

/// Which access decision a protected operation requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Any role in the organization.
    Member,
    /// The admin role in the organization.
    Admin,
}
