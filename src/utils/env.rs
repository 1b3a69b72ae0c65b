/// Get environment variable with ORGAUTH_ prefix, falling back to unprefixed version
///
/// Checks `ORGAUTH_{key}` first, then `{key}` for compatibility with
/// platform-provided variables such as `PORT` and `DATABASE_URL`.
///
/// # Examples
///
/// ```rust
/// use orgauth::get_env_with_prefix;
///
/// // Checks ORGAUTH_DATABASE_URL first, then DATABASE_URL
/// let url = get_env_with_prefix("DATABASE_URL");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("ORGAUTH_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse an environment variable, ignoring values that fail to parse.
pub(crate) fn parse_env_with_prefix<T: std::str::FromStr>(key: &str) -> Option<T> {
    get_env_with_prefix(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("ORGAUTH_ENV_TEST_VAR", "prefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("prefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ORGAUTH_ENV_TEST_VAR");
        }

        unsafe {
            std::env::set_var("ENV_FALLBACK_VAR", "unprefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_FALLBACK_VAR"), Some("unprefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ENV_FALLBACK_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_NON_EXISTENT_VAR"), None);
    }

    #[test]
    fn test_parse_env_ignores_garbage() {
        unsafe {
            std::env::set_var("ORGAUTH_ENV_PARSE_VAR", "not-a-number");
        }
        assert_eq!(parse_env_with_prefix::<u16>("ENV_PARSE_VAR"), None);
        unsafe {
            std::env::remove_var("ORGAUTH_ENV_PARSE_VAR");
        }
    }
}
