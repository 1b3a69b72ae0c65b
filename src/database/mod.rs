//! Database configuration and connection pooling.
//!
//! [`DatabaseConfig`] is always available so it can live inside [`crate::Config`];
//! the SeaORM pool requires the `database` feature.

pub mod config;
#[cfg(feature = "database")]
pub mod pool;

pub use config::{DatabaseConfig, redact_database_url};
#[cfg(feature = "database")]
pub use pool::SeaOrmPool;
#[cfg(feature = "database")]
pub use sea_orm;
