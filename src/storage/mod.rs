//! Storage traits for organizations, memberships and users.
//!
//! The services only talk to these traits. Two implementations ship with the
//! crate:
//!
//! - [`SeaOrmStore`] (feature `database`) - PostgreSQL or SQLite through SeaORM
//! - [`InMemoryStore`] (feature `memory-store`) - for tests, with injectable failures
//!
//! Store implementations report [`StoreError`](crate::StoreError); the services
//! translate those into [`AuthzError`](crate::AuthzError) and never let raw
//! storage errors escape.

mod membership;
mod organization;
mod user;

#[cfg(any(test, feature = "memory-store"))]
pub mod memory;
#[cfg(feature = "database")]
pub mod sea_orm_store;

pub use membership::MembershipStore;
pub use organization::OrganizationStore;
pub use user::UserStore;

#[cfg(any(test, feature = "memory-store"))]
pub use memory::{FailPoint, InMemoryStore};
#[cfg(feature = "database")]
pub use sea_orm_store::SeaOrmStore;
