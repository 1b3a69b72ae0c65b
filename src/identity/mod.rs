//! Identity resolution.
//!
//! Turns a bearer token into the internal [`Identity`](crate::Identity) of the
//! caller. Token verification sits behind [`TokenVerifier`]; the production
//! implementation is [`JwtTokenVerifier`].

mod jwt;
mod resolver;
mod token;
mod verifier;

pub use jwt::JwtTokenVerifier;
pub use resolver::IdentityResolver;
pub use token::TokenExtractor;
pub use verifier::{TokenVerifier, VerifiedCredential, VerifyError};
