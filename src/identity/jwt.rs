use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use super::verifier::{TokenVerifier, VerifiedCredential, VerifyError};
use crate::config::AuthConfig;

/// Claims read from an ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// JWT verifier backed by a static key.
///
/// Every call validates signature, expiry and the audience passed to
/// [`TokenVerifier::verify`]. Issuer validation is applied when configured
/// with [`with_issuer`](Self::with_issuer).
#[derive(Clone)]
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: Option<String>,
}

impl JwtTokenVerifier {
    /// Create a verifier using a static secret (for HS256)
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: None,
        }
    }

    /// Create a verifier using a static RSA public key (PEM format, RS256)
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, VerifyError> {
        let decoding_key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| VerifyError::Misconfigured(format!("Invalid RSA PEM: {}", e)))?;

        Ok(Self {
            decoding_key,
            algorithm: Algorithm::RS256,
            issuer: None,
        })
    }

    /// Build from auth config. The RSA key wins when both key sources are set.
    pub fn from_config(config: &AuthConfig) -> Result<Self, VerifyError> {
        let verifier = match (&config.jwt_public_key_pem, &config.jwt_secret) {
            (Some(pem), _) => Self::from_rsa_pem(pem.as_bytes())?,
            (None, Some(secret)) => Self::from_secret(secret.as_bytes()),
            (None, None) => {
                return Err(VerifyError::Misconfigured(
                    "no JWT secret or public key configured".to_string(),
                ));
            }
        };

        Ok(match &config.issuer {
            Some(issuer) => verifier.with_issuer(issuer.clone()),
            None => verifier,
        })
    }

    /// Require the `iss` claim to match.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    fn validation(&self, audience: &str) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.set_audience(&[audience]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, raw_token: &str, audience: &str) -> Result<VerifiedCredential, VerifyError> {
        let data = decode::<IdTokenClaims>(raw_token, &self.decoding_key, &self.validation(audience))
            .map_err(|e| VerifyError::Invalid(e.to_string()))?;

        let claims = data.claims;
        let email = claims
            .email
            .ok_or_else(|| VerifyError::Invalid("token has no email claim".to_string()))?;

        Ok(VerifiedCredential {
            subject: claims.sub,
            email,
            name: claims.name.filter(|n| !n.trim().is_empty()),
        })
    }
}
