//! Membership lifecycle.
//!
//! [`MembershipManager`] is the only writer of membership rows. Every mutation
//! is admin-gated and the gate runs before the operation's own input checks,
//! so a caller without rights learns nothing about the target.

use crate::access::AccessService;
use crate::error::{AuthzError, Result, StoreError};
use crate::storage::{MembershipStore, OrganizationStore};
use crate::types::{AccessOutcome, Identity, MemberWithUser, Membership, Organization, Requirement, Role};
use crate::utils::{current_timestamp, is_well_formed_id};
use tracing::{debug, error, info, instrument};

/// Membership manager - organization creation and member operations.
///
/// # Example
///
/// ```rust,ignore
/// use orgauth::{Identity, MembershipManager, Role};
///
/// let manager = MembershipManager::new(store.clone());
///
/// let org = manager.create_organization("Acme", &identity).await?;
/// manager.add_member(&identity, &org.id, &new_user_id, Role::Member).await?;
/// ```
#[derive(Clone)]
pub struct MembershipManager<S> {
    store: S,
    access: AccessService<S>,
}

impl<S> MembershipManager<S>
where
    S: OrganizationStore + MembershipStore + Clone,
{
    /// Create a new membership manager.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            access: AccessService::new(store.clone()),
            store,
        }
    }

    /// The access service used for this manager's checks.
    pub fn access(&self) -> &AccessService<S> {
        &self.access
    }

    /// Create an organization with `created_by` as its first admin.
    ///
    /// Both rows are written in one store transaction; on any failure neither
    /// exists.
    #[instrument(skip(self, created_by), fields(created_by = %created_by.user_id()))]
    pub async fn create_organization(&self, name: &str, created_by: &Identity) -> Result<Organization> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthzError::invalid_input("organization name is required"));
        }
        if !is_well_formed_id(created_by.user_id()) {
            return Err(AuthzError::invalid_input("malformed user id"));
        }

        let org = self
            .store
            .create_with_admin(name, created_by.user_id())
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => AuthzError::DuplicateOrganization,
                other => internal("create organization", other),
            })?;

        info!(org_id = %org.id, "Organization created");
        Ok(org)
    }

    /// Fetch an organization. Requires membership (any role).
    #[instrument(skip(self, acting), fields(acting = %acting.user_id()))]
    pub async fn get_organization(&self, acting: &Identity, org_id: &str) -> Result<Organization> {
        self.require(Requirement::Member, org_id, acting).await?;

        self.store
            .find_by_id(org_id)
            .await
            .map_err(|e| internal("find organization", e))?
            .ok_or(AuthzError::NotAMember)
    }

    /// Add a user to an organization. Requires admin.
    ///
    /// An existing membership is left untouched and reported as
    /// [`AuthzError::AlreadyMember`].
    #[instrument(skip(self, acting), fields(acting = %acting.user_id()))]
    pub async fn add_member(
        &self,
        acting: &Identity,
        org_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<Membership> {
        self.require(Requirement::Admin, org_id, acting).await?;
        validate_target(user_id)?;

        let membership = Membership {
            org_id: org_id.to_string(),
            user_id: user_id.to_string(),
            role,
            created_at: current_timestamp(),
        };

        self.store
            .insert_membership(&membership)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => AuthzError::AlreadyMember,
                other => internal("insert membership", other),
            })?;

        info!(org_id, user_id, role = %role, "Member added");
        Ok(membership)
    }

    /// List the organization's members with their display fields.
    /// Requires membership (any role).
    #[instrument(skip(self, acting), fields(acting = %acting.user_id()))]
    pub async fn list_members(&self, acting: &Identity, org_id: &str) -> Result<Vec<MemberWithUser>> {
        self.require(Requirement::Member, org_id, acting).await?;

        let members = self
            .store
            .list_members_with_users(org_id)
            .await
            .map_err(|e| internal("list members", e))?;

        debug!(count = members.len(), "Members listed");
        Ok(members)
    }

    /// Change an existing member's role. Requires admin.
    ///
    /// Never creates a membership: a missing target is [`AuthzError::NotAMember`].
    #[instrument(skip(self, acting), fields(acting = %acting.user_id()))]
    pub async fn update_role(
        &self,
        acting: &Identity,
        org_id: &str,
        user_id: &str,
        new_role: Role,
    ) -> Result<()> {
        self.require(Requirement::Admin, org_id, acting).await?;
        validate_target(user_id)?;

        self.store
            .update_role(org_id, user_id, new_role)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthzError::NotAMember,
                other => internal("update role", other),
            })?;

        info!(org_id, user_id, role = %new_role, "Member role updated");
        Ok(())
    }

    /// Remove a member. Requires admin.
    ///
    /// Removing a user who is not a member succeeds.
    #[instrument(skip(self, acting), fields(acting = %acting.user_id()))]
    pub async fn remove_member(&self, acting: &Identity, org_id: &str, user_id: &str) -> Result<()> {
        self.require(Requirement::Admin, org_id, acting).await?;
        validate_target(user_id)?;

        let removed = self
            .store
            .remove_member(org_id, user_id)
            .await
            .map_err(|e| internal("remove member", e))?;

        if removed {
            info!(org_id, user_id, "Member removed");
        } else {
            debug!(org_id, user_id, "Member already absent");
        }
        Ok(())
    }

    async fn require(&self, requirement: Requirement, org_id: &str, acting: &Identity) -> Result<Role> {
        let outcome = self.access.check(requirement, org_id, acting.user_id()).await;
        outcome_to_result(requirement, outcome)
    }
}

/// Map a decision to the error a lifecycle operation reports.
///
/// Admin-gated writes answer [`AuthzError::Unauthorized`] whether the caller
/// is a plain member or not a member at all. Member-gated reads report
/// [`AuthzError::NotAMember`].
pub(crate) fn outcome_to_result(requirement: Requirement, outcome: AccessOutcome) -> Result<Role> {
    match (requirement, outcome) {
        (_, AccessOutcome::Authorized(role)) => Ok(role),
        (Requirement::Admin, AccessOutcome::NotAMember | AccessOutcome::InsufficientRole(_)) => {
            Err(AuthzError::Unauthorized)
        }
        (Requirement::Member, AccessOutcome::NotAMember | AccessOutcome::InsufficientRole(_)) => {
            Err(AuthzError::NotAMember)
        }
        (_, AccessOutcome::InvalidInput) => {
            Err(AuthzError::invalid_input("malformed organization or user id"))
        }
        (_, AccessOutcome::LookupFailed) => Err(AuthzError::Internal),
    }
}

fn validate_target(user_id: &str) -> Result<()> {
    if is_well_formed_id(user_id) {
        Ok(())
    } else {
        Err(AuthzError::invalid_input("malformed user id"))
    }
}

fn internal(operation: &'static str, err: StoreError) -> AuthzError {
    error!(operation, error = %err, "Store operation failed");
    AuthzError::Internal
}
