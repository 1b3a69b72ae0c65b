//! Access decisions.
//!
//! Answers "may this user act on this organization?" by reading the caller's
//! membership row. Outcomes are computed from the store on every call and
//! never cached, so a role change or removal takes effect on the next check.

use crate::storage::MembershipStore;
use crate::types::{AccessOutcome, Requirement};
use crate::utils::is_well_formed_id;
use tracing::{debug, instrument, warn};

/// Access decision service.
///
/// # Example
///
/// ```rust,ignore
/// use orgauth::{AccessOutcome, AccessService};
///
/// let access = AccessService::new(store.clone());
///
/// match access.is_admin(&org_id, identity.user_id()).await {
///     AccessOutcome::Authorized(_) => { /* mutate */ }
///     AccessOutcome::InsufficientRole(role) => { /* member, but not admin */ }
///     AccessOutcome::NotAMember => { /* no row */ }
///     AccessOutcome::InvalidInput | AccessOutcome::LookupFailed => { /* reject */ }
/// }
/// ```
#[derive(Clone)]
pub struct AccessService<M> {
    store: M,
}

impl<M: MembershipStore> AccessService<M> {
    /// Create a new access service over a membership store.
    #[must_use]
    pub fn new(store: M) -> Self {
        Self { store }
    }

    /// Authorized with any role the user holds in the organization.
    pub async fn is_member(&self, org_id: &str, user_id: &str) -> AccessOutcome {
        self.check(Requirement::Member, org_id, user_id).await
    }

    /// Authorized only when the user holds the admin role.
    ///
    /// A member without the admin role gets [`AccessOutcome::InsufficientRole`],
    /// not [`AccessOutcome::NotAMember`].
    pub async fn is_admin(&self, org_id: &str, user_id: &str) -> AccessOutcome {
        self.check(Requirement::Admin, org_id, user_id).await
    }

    /// Evaluate a requirement for a user in an organization.
    #[instrument(skip(self))]
    pub async fn check(&self, requirement: Requirement, org_id: &str, user_id: &str) -> AccessOutcome {
        if !is_well_formed_id(org_id) || !is_well_formed_id(user_id) {
            debug!("malformed organization or user id");
            return AccessOutcome::InvalidInput;
        }

        let membership = match self.store.get_membership(org_id, user_id).await {
            Ok(Some(membership)) => membership,
            Ok(None) => {
                debug!("no membership row");
                return AccessOutcome::NotAMember;
            }
            Err(e) => {
                warn!(error = %e, "membership lookup failed");
                return AccessOutcome::LookupFailed;
            }
        };

        let outcome = match requirement {
            Requirement::Member => AccessOutcome::Authorized(membership.role),
            Requirement::Admin if membership.role.is_admin() => {
                AccessOutcome::Authorized(membership.role)
            }
            Requirement::Admin => AccessOutcome::InsufficientRole(membership.role),
        };

        debug!(?outcome, "access decided");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FailPoint, InMemoryStore};
    use crate::types::{Membership, Role};
    use crate::utils::{current_timestamp, new_id};

    async fn seeded() -> (AccessService<InMemoryStore>, InMemoryStore, String, String, String) {
        let store = InMemoryStore::new();
        let org_id = new_id();
        let admin = new_id();
        let member = new_id();
        for (user_id, role) in [(&admin, Role::Admin), (&member, Role::Member)] {
            store
                .insert_membership(&Membership {
                    org_id: org_id.clone(),
                    user_id: user_id.clone(),
                    role,
                    created_at: current_timestamp(),
                })
                .await
                .unwrap();
        }
        (AccessService::new(store.clone()), store, org_id, admin, member)
    }

    #[tokio::test]
    async fn test_member_check_accepts_any_role() {
        let (access, _, org, admin, member) = seeded().await;
        assert_eq!(access.is_member(&org, &admin).await, AccessOutcome::Authorized(Role::Admin));
        assert_eq!(access.is_member(&org, &member).await, AccessOutcome::Authorized(Role::Member));
    }

    #[tokio::test]
    async fn test_admin_check_distinguishes_role_from_membership() {
        let (access, _, org, admin, member) = seeded().await;
        assert_eq!(access.is_admin(&org, &admin).await, AccessOutcome::Authorized(Role::Admin));
        assert_eq!(
            access.is_admin(&org, &member).await,
            AccessOutcome::InsufficientRole(Role::Member)
        );
        assert_eq!(access.is_admin(&org, &new_id()).await, AccessOutcome::NotAMember);
    }

    #[tokio::test]
    async fn test_malformed_ids_skip_the_store() {
        let (access, store, org, admin, _) = seeded().await;
        store.fail_on(FailPoint::MembershipRead);

        assert_eq!(access.is_member("not-a-uuid", &admin).await, AccessOutcome::InvalidInput);
        assert_eq!(access.is_admin(&org, "").await, AccessOutcome::InvalidInput);
    }

    #[tokio::test]
    async fn test_store_failure_is_lookup_failed() {
        let (access, store, org, admin, _) = seeded().await;
        store.fail_on(FailPoint::MembershipRead);
        assert_eq!(access.is_member(&org, &admin).await, AccessOutcome::LookupFailed);
    }

    #[tokio::test]
    async fn test_decisions_are_not_cached() {
        let (access, store, org, _, member) = seeded().await;
        assert!(access.is_member(&org, &member).await.is_authorized());

        store.remove_member(&org, &member).await.unwrap();
        assert_eq!(access.is_member(&org, &member).await, AccessOutcome::NotAMember);
    }
}
