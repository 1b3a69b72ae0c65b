//! Identity and organization access middleware.

use super::extractors::OrgAccess;
use crate::access::AccessService;
use crate::error::AuthzError;
use crate::identity::{IdentityResolver, TokenExtractor, TokenVerifier};
use crate::storage::{MembershipStore, UserStore};
use crate::types::{AccessOutcome, Identity, Requirement};
use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for async middleware function return type.
pub type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthzError>> + Send>>;

/// Path parameter holding the organization id unless configured otherwise.
pub const DEFAULT_ORG_PARAM: &str = "org_id";

/// Middleware that resolves the bearer token into an [`Identity`].
///
/// Missing or invalid tokens are rejected with 401 before any handler or
/// organization check runs.
pub struct ResolveIdentity;

impl ResolveIdentity {
    /// Create the middleware function for `axum::middleware::from_fn`.
    pub fn middleware<U, V>(
        resolver: IdentityResolver<U, V>,
    ) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static
    where
        U: UserStore + 'static,
        V: TokenVerifier + 'static,
    {
        let resolver = Arc::new(resolver);
        move |mut request: Request, next: Next| -> MiddlewareFuture {
            let resolver = Arc::clone(&resolver);
            Box::pin(async move {
                let token = TokenExtractor::from_headers(request.headers())?;
                let identity = resolver.resolve(&token).await?;

                request.extensions_mut().insert(identity);
                Ok::<_, AuthzError>(next.run(request).await)
            })
        }
    }
}

/// Middleware that requires a role in the organization named by the path.
///
/// Apply with `route_layer` so the path parameters are available. On success
/// the granted [`OrgAccess`] is attached to the request.
///
/// # Errors
///
/// - no [`Identity`] in the request: 401, checked before any store access
/// - missing or malformed organization id: 400
/// - not a member, or member without the required role: 403
/// - membership lookup failure: 500
pub struct RequireOrgAccess;

impl RequireOrgAccess {
    /// Require any role in the organization.
    pub fn member<M>(
        access: AccessService<M>,
    ) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static
    where
        M: MembershipStore + 'static,
    {
        Self::check(access, Requirement::Member, DEFAULT_ORG_PARAM)
    }

    /// Require the admin role in the organization.
    pub fn admin<M>(
        access: AccessService<M>,
    ) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static
    where
        M: MembershipStore + 'static,
    {
        Self::check(access, Requirement::Admin, DEFAULT_ORG_PARAM)
    }

    /// Require `requirement`, reading the organization id from `path_param`.
    pub fn check<M>(
        access: AccessService<M>,
        requirement: Requirement,
        path_param: &'static str,
    ) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static
    where
        M: MembershipStore + 'static,
    {
        let access = Arc::new(access);
        move |request: Request, next: Next| -> MiddlewareFuture {
            let access = Arc::clone(&access);
            Box::pin(async move {
                let (mut parts, body) = request.into_parts();

                let user_id = parts
                    .extensions
                    .get::<Identity>()
                    .map(|identity| identity.user_id().to_string())
                    .ok_or(AuthzError::Unauthenticated)?;

                let org_id = org_id_from_path(&mut parts, path_param)
                    .await
                    .ok_or_else(|| AuthzError::invalid_input("missing organization id"))?;

                let role = match access.check(requirement, &org_id, &user_id).await {
                    AccessOutcome::Authorized(role) => role,
                    AccessOutcome::NotAMember | AccessOutcome::InsufficientRole(_) => {
                        return Err(AuthzError::Unauthorized);
                    }
                    AccessOutcome::InvalidInput => {
                        return Err(AuthzError::invalid_input("malformed organization id"));
                    }
                    AccessOutcome::LookupFailed => return Err(AuthzError::Internal),
                };

                parts.extensions.insert(OrgAccess { org_id, role });
                Ok::<_, AuthzError>(next.run(Request::from_parts(parts, body)).await)
            })
        }
    }
}

async fn org_id_from_path(parts: &mut Parts, name: &str) -> Option<String> {
    let params = RawPathParams::from_request_parts(parts, &()).await.ok()?;
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
