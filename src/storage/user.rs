//! User storage trait.

use crate::error::StoreResult;
use crate::types::{NewUser, User};
use async_trait::async_trait;

/// Trait for the user lookups needed by identity resolution.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user linked to `new_user.external_id`, creating or linking one if needed.
    ///
    /// Runs as a single transaction:
    /// 1. a user already linked to the external id is returned as is;
    /// 2. otherwise a user with the same email gets the external id linked;
    /// 3. otherwise a new user is inserted.
    ///
    /// A concurrent resolution of the same credential can make step 3 fail with
    /// [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation).
    async fn find_or_create_by_external_id(&self, new_user: &NewUser) -> StoreResult<User>;
}
