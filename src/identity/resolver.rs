use tracing::{debug, error, instrument, warn};

use super::verifier::{TokenVerifier, VerifiedCredential};
use crate::error::{AuthzError, Result, StoreError};
use crate::storage::UserStore;
use crate::types::{Identity, NewUser, User};
use crate::utils::username_from_email;

/// Resolves bearer tokens into internal identities.
///
/// First login creates the user; a login whose email matches an existing user
/// links the external subject to that user. Nothing is cached between calls.
#[derive(Clone)]
pub struct IdentityResolver<U, V> {
    users: U,
    verifier: V,
    audience: String,
}

impl<U, V> IdentityResolver<U, V>
where
    U: UserStore,
    V: TokenVerifier,
{
    /// Create a resolver that accepts tokens issued for `audience`.
    pub fn new(users: U, verifier: V, audience: impl Into<String>) -> Self {
        Self {
            users,
            verifier,
            audience: audience.into(),
        }
    }

    /// Verify a raw bearer token and resolve its internal identity.
    #[instrument(skip_all)]
    pub async fn resolve(&self, raw_token: &str) -> Result<Identity> {
        let credential = self
            .verifier
            .verify(raw_token, &self.audience)
            .await
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AuthzError::Unauthenticated
            })?;

        self.resolve_credential(&credential).await
    }

    /// Resolve an already verified credential to an internal identity.
    #[instrument(skip_all, fields(subject = %credential.subject))]
    pub async fn resolve_credential(&self, credential: &VerifiedCredential) -> Result<Identity> {
        if credential.subject.trim().is_empty() || credential.email.trim().is_empty() {
            warn!("verified credential is missing subject or email");
            return Err(AuthzError::Unauthenticated);
        }

        let new_user = NewUser {
            external_id: credential.subject.clone(),
            email: credential.email.clone(),
            username: credential
                .name
                .clone()
                .unwrap_or_else(|| username_from_email(&credential.email)),
        };

        let user = self.find_or_create(&new_user).await?;
        debug!(user_id = %user.id, "identity resolved");
        Ok(Identity::new(user.id))
    }

    async fn find_or_create(&self, new_user: &NewUser) -> Result<User> {
        match self.users.find_or_create_by_external_id(new_user).await {
            Ok(user) => return Ok(user),
            // A concurrent first login won the insert; the retry finds its row.
            Err(StoreError::UniqueViolation(detail)) => {
                debug!(%detail, "concurrent user creation, retrying");
            }
            Err(e) => {
                error!(error = %e, "user lookup failed");
                return Err(AuthzError::Internal);
            }
        }

        self.users
            .find_or_create_by_external_id(new_user)
            .await
            .map_err(|e| {
                error!(error = %e, "user lookup failed after retry");
                AuthzError::Internal
            })
    }
}
