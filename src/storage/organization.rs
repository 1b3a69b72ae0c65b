//! Organization storage trait.

use crate::error::StoreResult;
use crate::types::Organization;
use async_trait::async_trait;

/// Trait for organization storage operations.
///
/// # Important: Atomic Creation
///
/// [`create_with_admin`](OrganizationStore::create_with_admin) must insert the
/// organization row and the creator's admin membership in one transaction.
/// If either insert fails, neither row may remain. An organization without an
/// admin is unrecoverable through the public API.
///
/// Implementations must also enforce a unique constraint on the organization
/// name and report violations as [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation):
///
/// ```sql
/// CREATE TABLE organizations (
///     id VARCHAR(36) PRIMARY KEY,
///     name VARCHAR(255) UNIQUE NOT NULL,  -- Unique constraint required!
///     ...
/// );
/// ```
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Create an organization and give `created_by` the admin role in it.
    ///
    /// The store assigns the organization id.
    async fn create_with_admin(&self, name: &str, created_by: &str) -> StoreResult<Organization>;

    /// Find an organization by its ID.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Organization>>;
}
