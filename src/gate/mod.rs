//! Authorization gate for axum routers.
//!
//! Two middleware stages protect organization-scoped routes:
//!
//! 1. [`ResolveIdentity`] turns the bearer token into an [`Identity`](crate::Identity)
//!    once per request and stores it in the request extensions.
//! 2. [`RequireOrgAccess`] runs per protected route, reads the organization id
//!    from the path and asks the [`AccessService`](crate::AccessService) for a
//!    decision before the handler runs.
//!
//! Handlers read the results with the [`CurrentIdentity`] and
//! [`CurrentOrgAccess`] extractors.
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{Router, middleware::from_fn, routing::{get, post}};
//! use orgauth::gate::{RequireOrgAccess, ResolveIdentity};
//!
//! let app = Router::new()
//!     .route(
//!         "/orgs/{org_id}/users",
//!         get(list_members)
//!             .route_layer(from_fn(RequireOrgAccess::member(access.clone())))
//!             .merge(post(add_member).route_layer(from_fn(RequireOrgAccess::admin(access)))),
//!     )
//!     .layer(from_fn(ResolveIdentity::middleware(resolver)));
//! ```

mod extractors;
mod middleware;

pub use extractors::{CurrentIdentity, CurrentOrgAccess, OrgAccess};
pub use middleware::{DEFAULT_ORG_PARAM, MiddlewareFuture, RequireOrgAccess, ResolveIdentity};
