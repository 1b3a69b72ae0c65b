//! Membership storage trait.

use crate::error::StoreResult;
use crate::types::{MemberWithUser, Membership, Role};
use async_trait::async_trait;

/// Trait for membership storage operations.
///
/// `(org_id, user_id)` is unique. Writes never upsert: inserting an existing
/// pair is a [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation),
/// updating a missing pair is [`StoreError::NotFound`](crate::StoreError::NotFound).
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Get the membership for a user in an organization.
    async fn get_membership(&self, org_id: &str, user_id: &str) -> StoreResult<Option<Membership>>;

    /// Insert a new membership row.
    async fn insert_membership(&self, membership: &Membership) -> StoreResult<()>;

    /// Change the role of an existing membership.
    async fn update_role(&self, org_id: &str, user_id: &str, role: Role) -> StoreResult<()>;

    /// Delete a membership. Returns whether a row was removed.
    async fn remove_member(&self, org_id: &str, user_id: &str) -> StoreResult<bool>;

    /// List every membership of an organization joined with user display fields.
    ///
    /// Ordered by membership creation; the order is stable for a snapshot.
    async fn list_members_with_users(&self, org_id: &str) -> StoreResult<Vec<MemberWithUser>>;
}
