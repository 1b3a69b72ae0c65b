//! In-memory store for tests.
//!
//! Implements every storage trait over a single mutex-guarded state, so each
//! trait method is one atomic step. Failures can be injected per operation with
//! [`InMemoryStore::fail_on`] to exercise rollback and error-translation paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{MembershipStore, OrganizationStore, UserStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{MemberWithUser, Membership, NewUser, Organization, Role, User};
use crate::utils::{current_timestamp, new_id};

/// Store operations that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Inserting the organization row in `create_with_admin`.
    OrganizationInsert,
    /// Inserting the creator's admin membership in `create_with_admin`.
    AdminMembershipInsert,
    /// `OrganizationStore::find_by_id`.
    OrganizationRead,
    /// `get_membership` and `list_members_with_users`.
    MembershipRead,
    /// `insert_membership`, `update_role` and `remove_member`.
    MembershipWrite,
    /// `find_or_create_by_external_id`.
    UserWrite,
}

struct Failure {
    error: StoreError,
    once: bool,
}

#[derive(Default)]
struct State {
    organizations: Vec<Organization>,
    users: Vec<User>,
    memberships: Vec<Membership>,
    failures: HashMap<FailPoint, Failure>,
}

impl State {
    fn check(&mut self, point: FailPoint) -> StoreResult<()> {
        let Some(failure) = self.failures.get(&point) else {
            return Ok(());
        };
        let error = failure.error.clone();
        if failure.once {
            self.failures.remove(&point);
        }
        Err(error)
    }

    fn membership_index(&self, org_id: &str, user_id: &str) -> Option<usize> {
        self.memberships
            .iter()
            .position(|m| m.org_id == org_id && m.user_id == user_id)
    }
}

/// In-memory store implementing all storage traits.
///
/// Cloning shares the same underlying data (uses Arc internally).
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call through `point` fail with a backend error.
    pub fn fail_on(&self, point: FailPoint) {
        self.fail_with(point, StoreError::backend(format!("injected failure at {point:?}")));
    }

    /// Make every call through `point` fail with `error`.
    pub fn fail_with(&self, point: FailPoint, error: StoreError) {
        self.lock().failures.insert(point, Failure { error, once: false });
    }

    /// Make only the next call through `point` fail with `error`.
    pub fn fail_once_with(&self, point: FailPoint, error: StoreError) {
        self.lock().failures.insert(point, Failure { error, once: true });
    }

    /// Remove an injected failure.
    pub fn clear_failure(&self, point: FailPoint) {
        self.lock().failures.remove(&point);
    }

    /// Helper to insert a user directly (for test setup).
    pub fn add_user(&self, username: &str, email: &str) -> User {
        let now = current_timestamp();
        let user = User {
            id: new_id(),
            username: username.to_string(),
            email: email.to_string(),
            external_id: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().users.push(user.clone());
        user
    }

    /// Snapshot of all organizations.
    pub fn organizations(&self) -> Vec<Organization> {
        self.lock().organizations.clone()
    }

    /// Snapshot of all memberships, in insertion order.
    pub fn memberships(&self) -> Vec<Membership> {
        self.lock().memberships.clone()
    }

    /// Snapshot of all users.
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn create_with_admin(&self, name: &str, created_by: &str) -> StoreResult<Organization> {
        let mut state = self.lock();

        // Nothing is written until both inserts have passed their checks.
        state.check(FailPoint::OrganizationInsert)?;
        if state.organizations.iter().any(|o| o.name == name) {
            return Err(StoreError::UniqueViolation(format!(
                "organizations.name '{name}' already exists"
            )));
        }

        let now = current_timestamp();
        let org = Organization {
            id: new_id(),
            name: name.to_string(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };
        let admin = Membership {
            org_id: org.id.clone(),
            user_id: created_by.to_string(),
            role: Role::Admin,
            created_at: now,
        };

        state.check(FailPoint::AdminMembershipInsert)?;

        state.organizations.push(org.clone());
        state.memberships.push(admin);
        Ok(org)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Organization>> {
        let mut state = self.lock();
        state.check(FailPoint::OrganizationRead)?;
        Ok(state.organizations.iter().find(|o| o.id == id).cloned())
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn get_membership(&self, org_id: &str, user_id: &str) -> StoreResult<Option<Membership>> {
        let mut state = self.lock();
        state.check(FailPoint::MembershipRead)?;
        Ok(state
            .membership_index(org_id, user_id)
            .map(|i| state.memberships[i].clone()))
    }

    async fn insert_membership(&self, membership: &Membership) -> StoreResult<()> {
        let mut state = self.lock();
        state.check(FailPoint::MembershipWrite)?;
        if state
            .membership_index(&membership.org_id, &membership.user_id)
            .is_some()
        {
            return Err(StoreError::UniqueViolation(
                "organization_members (org_id, user_id)".to_string(),
            ));
        }
        state.memberships.push(membership.clone());
        Ok(())
    }

    async fn update_role(&self, org_id: &str, user_id: &str, role: Role) -> StoreResult<()> {
        let mut state = self.lock();
        state.check(FailPoint::MembershipWrite)?;
        let index = state
            .membership_index(org_id, user_id)
            .ok_or(StoreError::NotFound)?;
        state.memberships[index].role = role;
        Ok(())
    }

    async fn remove_member(&self, org_id: &str, user_id: &str) -> StoreResult<bool> {
        let mut state = self.lock();
        state.check(FailPoint::MembershipWrite)?;
        match state.membership_index(org_id, user_id) {
            Some(index) => {
                state.memberships.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_members_with_users(&self, org_id: &str) -> StoreResult<Vec<MemberWithUser>> {
        let mut state = self.lock();
        state.check(FailPoint::MembershipRead)?;
        let members = state
            .memberships
            .iter()
            .filter(|m| m.org_id == org_id)
            .map(|m| {
                let user = state.users.iter().find(|u| u.id == m.user_id);
                MemberWithUser {
                    membership: m.clone(),
                    username: user.map(|u| u.username.clone()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                }
            })
            .collect();
        Ok(members)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_or_create_by_external_id(&self, new_user: &NewUser) -> StoreResult<User> {
        let mut state = self.lock();
        state.check(FailPoint::UserWrite)?;

        if let Some(user) = state
            .users
            .iter()
            .find(|u| u.external_id.as_deref() == Some(new_user.external_id.as_str()))
        {
            return Ok(user.clone());
        }

        let now = current_timestamp();
        if let Some(user) = state.users.iter_mut().find(|u| u.email == new_user.email) {
            user.external_id = Some(new_user.external_id.clone());
            user.updated_at = now;
            return Ok(user.clone());
        }

        let user = User {
            id: new_id(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            external_id: Some(new_user.external_id.clone()),
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }
}
