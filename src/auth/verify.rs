use axum::http::HeaderValue;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::Claims;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a credential could not be turned into [`Claims`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("Authentication required")]
    MissingCredential,

    #[error("Malformed authorization header")]
    MalformedCredential,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidSignature(String),
}

/// Verifies bearer tokens against the process secret.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone)]
pub struct CredentialVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl CredentialVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // A token is expired the second its exp passes
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify the raw `Authorization` header value of a request
    pub fn verify(&self, header: Option<&HeaderValue>) -> Result<Claims, AuthFailure> {
        let token = extract_bearer(header)?;
        self.verify_token(token)
    }

    /// Validate an already extracted token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthFailure> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::Expired,
                _ => AuthFailure::InvalidSignature(e.to_string()),
            })
    }
}

/// Extract the token from a `Bearer <token>` header value
pub fn extract_bearer(header: Option<&HeaderValue>) -> Result<&str, AuthFailure> {
    let header = header.ok_or(AuthFailure::MissingCredential)?;
    let value = header
        .to_str()
        .map_err(|_| AuthFailure::MalformedCredential)?;

    if value == BEARER_PREFIX.trim_end() {
        return Err(AuthFailure::MalformedCredential);
    }

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthFailure::MissingCredential)?
        .trim();

    if token.is_empty() {
        return Err(AuthFailure::MalformedCredential);
    }

    Ok(token)
}
