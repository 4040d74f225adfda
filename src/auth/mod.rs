//! Bearer credentials: verification of incoming tokens and issuance of new ones.

mod verify;

pub use verify::{extract_bearer, AuthFailure, CredentialVerifier};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Verified identity carried by a request.
///
/// Only [`CredentialVerifier`] produces values of this type; the fields are
/// private so no other code path can fabricate one.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    iat: Option<i64>,
    exp: i64,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.iat
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Claims as written into a freshly issued token
#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    name: &'a str,
    is_admin: bool,
    iat: i64,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT expiry out of range")]
    InvalidExpiry,
}

/// Signs HS256 tokens with the process secret
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    expiry: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            expiry: i64::try_from(expiry_hours)
                .ok()
                .and_then(Duration::try_hours)
                .ok_or(JwtError::InvalidExpiry)?,
        })
    }

    pub fn issue(&self, subject: &str, name: &str, is_admin: bool) -> Result<String, JwtError> {
        self.issue_at(subject, name, is_admin, Utc::now())
    }

    /// Issue a token as if it had been minted at `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        name: &str,
        is_admin: bool,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let expires = now.checked_add_signed(self.expiry).ok_or(JwtError::InvalidExpiry)?;
        let claims = IssuedClaims {
            sub: subject,
            name,
            is_admin,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        encode(&Header::default(), &claims, &self.key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }
}
