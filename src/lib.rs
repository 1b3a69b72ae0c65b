//! orgauth - organization authorization and membership consistency
//!
//! Resolves who is making a request, decides whether that identity may act on
//! an organization, and keeps membership data consistent: every organization
//! is created together with its first admin, and a user never holds two
//! memberships in the same organization.
//!
//! # Features
//!
//! - **Identity**: bearer token verification behind [`TokenVerifier`], with
//!   first-login user creation and account linking by email
//! - **Access decisions**: [`AccessService::is_member`] / [`AccessService::is_admin`]
//!   returning a typed [`AccessOutcome`]
//! - **Membership lifecycle**: [`MembershipManager`] with admin-gated mutations
//! - **Gate**: axum middleware and extractors in [`gate`]
//! - **Storage**: SeaORM store (`database` feature) and an in-memory store
//!   with injectable failures (`memory-store` feature)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use axum::{Router, middleware::from_fn};
//! use orgauth::gate::{RequireOrgAccess, ResolveIdentity};
//! use orgauth::storage::SeaOrmStore;
//! use orgauth::{AccessService, ConfigBuilder, IdentityResolver, JwtTokenVerifier, SeaOrmPool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     orgauth::init_tracing_with_config(&config);
//!
//!     let pool = SeaOrmPool::from_config(&config.database).await?;
//!     let store = SeaOrmStore::new(pool.inner().clone());
//!
//!     let verifier = JwtTokenVerifier::from_config(&config.auth)?;
//!     let resolver = IdentityResolver::new(store.clone(), verifier, config.auth.audience.clone());
//!     let access = AccessService::new(store.clone());
//!
//!     let app: Router = Router::new()
//!         // .route("/orgs/{org_id}/users", get(list_members))
//!         .route_layer(from_fn(RequireOrgAccess::member(access)))
//!         .layer(from_fn(ResolveIdentity::middleware(resolver)));
//!     # Ok(())
//! }
//! ```

pub mod access;
mod config;
pub mod database;
mod error;
pub mod gate;
pub mod identity;
pub mod membership;
pub mod storage;
#[cfg(feature = "testing")]
pub mod testing;
mod types;
mod utils;

// Re-exports for public API
pub use access::AccessService;
pub use config::{AuthConfig, Config, ConfigBuilder, ConfigError, LoggingConfig};
pub use database::DatabaseConfig;
#[cfg(feature = "database")]
pub use database::SeaOrmPool;
pub use error::{AuthzError, ErrorResponse, Result, StoreError, StoreResult};
pub use identity::{IdentityResolver, JwtTokenVerifier, TokenVerifier, VerifiedCredential, VerifyError};
pub use membership::MembershipManager;
pub use types::{
    AccessOutcome, Identity, MemberWithUser, Membership, NewUser, Organization, ParseRoleError,
    Requirement, Role, User,
};
pub use utils::{get_env_with_prefix, is_well_formed_id};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "orgauth=debug")
/// - `ORGAUTH_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    install(env_filter, json_logs);
}

/// Initialize tracing with a custom configuration
///
/// `RUST_LOG` still wins over the configured level when set.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install(env_filter, config.logging.json);
}

fn install(env_filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
