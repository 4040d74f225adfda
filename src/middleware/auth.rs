use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{AuthFailure, Claims, CredentialVerifier};
use crate::error::ApiError;

/// Privilege a route requires. Ordered: `Admin` implies `Authenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Privilege {
    Public,
    Authenticated,
    Admin,
}

/// Outcome of the access check for one request
#[derive(Debug)]
pub enum Decision {
    /// Proceed; carries the caller's claims when a credential was verified
    Allow(Option<Claims>),
    Deny(ApiError),
}

/// Decide whether a verification outcome satisfies `required`
pub fn authorize(verified: Result<Claims, AuthFailure>, required: Privilege) -> Decision {
    match required {
        Privilege::Public => Decision::Allow(verified.ok()),
        Privilege::Authenticated | Privilege::Admin => match verified {
            Err(failure) => Decision::Deny(failure.into()),
            Ok(claims) if required == Privilege::Admin && !claims.is_admin() => {
                Decision::Deny(ApiError::forbidden("Admin privileges required"))
            }
            Ok(claims) => Decision::Allow(Some(claims)),
        },
    }
}

/// Check a request's headers against `required`.
///
/// Public routes never consult the verifier.
pub fn check(verifier: &CredentialVerifier, headers: &HeaderMap, required: Privilege) -> Decision {
    if required == Privilege::Public {
        return Decision::Allow(None);
    }

    let decision = authorize(verifier.verify(headers.get(AUTHORIZATION)), required);
    if let Decision::Deny(err) = &decision {
        tracing::warn!("Access denied ({:?} required): {}", required, err);
    }
    decision
}
