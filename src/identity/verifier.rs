use async_trait::async_trait;

/// Claims of a credential that passed verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedCredential {
    /// Stable subject id from the identity provider.
    pub subject: String,
    /// Email asserted by the identity provider.
    pub email: String,
    /// Display name, if the provider supplied one.
    pub name: Option<String>,
}

/// Why a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Bad signature, wrong audience or issuer, expired, or malformed.
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// The verifier itself could not be set up (bad key material).
    #[error("Verifier misconfigured: {0}")]
    Misconfigured(String),
}

/// Trait for token verification.
///
/// Implement this trait to plug in any identity provider. Verification
/// internals (key fetching, signature checks) stay behind this boundary.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `raw_token` was issued for `audience` and return its claims.
    async fn verify(&self, raw_token: &str, audience: &str) -> Result<VerifiedCredential, VerifyError>;
}
