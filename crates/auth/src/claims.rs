use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use minibank_core::{AccountId, DomainError};

/// Session token claims (transport-agnostic).
///
/// `sub` is the account the token was issued for; nothing else about the
/// account is trusted from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated account.
    pub sub: AccountId,

    /// Unique token id.
    pub jti: Uuid,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn new(sub: AccountId, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            sub,
            jti: Uuid::now_v7(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl From<TokenValidationError> for DomainError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => DomainError::TokenExpired,
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                DomainError::InvalidToken
            }
        }
    }
}

/// Deterministically validate the claims' time window against `now`.
///
/// Signature verification happens before this, in [`crate::TokenCodec`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
