//! Authorization gate
//!
//! Every protected request walks the same path:
//! `Unauthenticated -> TokenPresented -> {Verified, Rejected}` and, for routes scoped to
//! a single account, `Verified -> {OwnershipOK, OwnershipViolation}`. Only `OwnershipOK`
//! (or `Verified` on routes without an owner) reaches a handler.

use super::{
    jwt::{JwtService, TokenError},
    middleware::AuthContext,
};
use thiserror::Error;

/// Why the gate refused a request. All variants surface to the client as 401.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("no bearer token presented")]
    MissingToken,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("token subject does not own the resource")]
    OwnershipViolation,
}

/// Parse a raw `Authorization` header value into its bearer token
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Verify the presented credentials and recover the caller's identity
pub fn authenticate(
    jwt_service: &JwtService,
    authorization: Option<&str>,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(authorization)?;
    let claims = jwt_service.verify(token)?;

    Ok(AuthContext {
        username: claims.sub,
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}

impl AuthContext {
    /// Ownership check for account-scoped resources
    pub fn authorize_owner(&self, resource_owner: &str) -> Result<(), AuthError> {
        if self.username == resource_owner {
            Ok(())
        } else {
            tracing::warn!(
                subject = %self.username,
                resource_owner = %resource_owner,
                "Ownership check failed"
            );
            Err(AuthError::OwnershipViolation)
        }
    }
}
