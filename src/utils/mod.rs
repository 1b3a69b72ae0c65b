//! Utility functions and helpers.
//!
//! Environment variable handling, timestamps and identifier checks.

pub mod env;

pub use env::get_env_with_prefix;

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Get current Unix timestamp in seconds.
#[inline]
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Generate a new store identifier.
#[inline]
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check that an organization or user id is a well-formed UUID.
#[inline]
pub fn is_well_formed_id(id: &str) -> bool {
    !id.is_empty() && Uuid::parse_str(id).is_ok()
}

/// Derive a display name from an email address.
///
/// Falls back to the whole address when there is no local part.
pub(crate) fn username_from_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_ids() {
        assert!(is_well_formed_id(&new_id()));
        assert!(is_well_formed_id("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_well_formed_id(""));
        assert!(!is_well_formed_id("u1"));
        assert!(!is_well_formed_id("a53e4b0c-9d6c-4f7f-8c3b-5a1e2f3g4h5i"));
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("jane.doe@example.com"), "jane.doe");
        assert_eq!(username_from_email("@example.com"), "@example.com");
        assert_eq!(username_from_email("nobody"), "nobody");
    }
}
