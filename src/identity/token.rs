use axum::http::{HeaderMap, header::AUTHORIZATION};

use crate::error::AuthzError;

/// Extracts bearer token from request headers
pub struct TokenExtractor;

impl TokenExtractor {
    /// Extract token from Authorization header
    pub fn from_headers(headers: &HeaderMap) -> Result<String, AuthzError> {
        let auth_header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("missing authorization header");
                AuthzError::Unauthenticated
            })?;

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            tracing::debug!("authorization header is not a bearer token");
            return Err(AuthzError::Unauthenticated);
        };

        let token = token.trim();
        if token.is_empty() {
            return Err(AuthzError::Unauthenticated);
        }

        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_from_valid_bearer_header() {
        assert_eq!(TokenExtractor::from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_rejects_missing_or_malformed_header() {
        assert_eq!(
            TokenExtractor::from_headers(&HeaderMap::new()),
            Err(AuthzError::Unauthenticated)
        );
        assert_eq!(
            TokenExtractor::from_headers(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthzError::Unauthenticated)
        );
        assert_eq!(
            TokenExtractor::from_headers(&headers("Bearer    ")),
            Err(AuthzError::Unauthenticated)
        );
    }
}
