//! Axum extractors for the resolved identity and granted organization access.

use crate::error::AuthzError;
use crate::types::{Identity, Role};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::future::Future;

/// Access granted by [`RequireOrgAccess`](super::RequireOrgAccess) for the current request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrgAccess {
    /// Organization the request is scoped to.
    pub org_id: String,
    /// Role the caller holds in it.
    pub role: Role,
}

/// Extract the caller's identity.
///
/// Requires [`ResolveIdentity`](super::ResolveIdentity) to have run; without an
/// identity the request is rejected as unauthenticated.
///
/// ```rust,ignore
/// async fn create_org(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
///     manager.create_organization("Acme", &identity).await
/// }
/// ```
#[derive(Clone, Debug)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthzError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().cloned();
        async move { identity.map(CurrentIdentity).ok_or(AuthzError::Unauthenticated) }
    }
}

/// Extract the organization access granted by the gate.
///
/// Only available on routes behind [`RequireOrgAccess`](super::RequireOrgAccess).
#[derive(Clone, Debug)]
pub struct CurrentOrgAccess(pub OrgAccess);

impl<S> FromRequestParts<S> for CurrentOrgAccess
where
    S: Send + Sync,
{
    type Rejection = AuthzError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let access = parts.extensions.get::<OrgAccess>().cloned();
        async move {
            access.map(CurrentOrgAccess).ok_or_else(|| {
                tracing::error!("CurrentOrgAccess used on a route without RequireOrgAccess");
                AuthzError::Internal
            })
        }
    }
}
