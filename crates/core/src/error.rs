//! Domain error model.

use thiserror::Error;

use crate::id::AccountId;
use crate::money::Amount;

/// Result type used across the ledger and auth layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is terminal for the operation that produced it. Nothing in
/// the core retries; the transport decides how to present each kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A caller-supplied value failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Another account already owns this username.
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    /// Unknown username or wrong password. Deliberately does not say which.
    #[error("bad username or password")]
    AuthenticationFailed,

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Amount,
        requested: Amount,
    },

    /// Token is malformed, badly signed, or bound to an unknown account.
    #[error("invalid token")]
    InvalidToken,

    #[error("token has expired")]
    TokenExpired,

    /// Hashing or signing machinery failed. Not caused by the caller's input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn duplicate_username(username: impl Into<String>) -> Self {
        Self::DuplicateUsername(username.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable snake_case code for logs and wire responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::DuplicateUsername(_) => "duplicate_username",
            Self::AuthenticationFailed => "authentication_failed",
            Self::AccountNotFound(_) => "account_not_found",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidToken => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::Internal(_) => "internal",
        }
    }
}
