//! Login and token resolution in front of the account store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use minibank_core::{AccountId, Amount, Currency, DomainError, DomainResult};
use minibank_ledger::{AccountStore, AccountView};

use crate::claims::{SessionClaims, validate_claims};
use crate::token::TokenCodec;

/// Session policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// How long an issued token stays valid.
    pub token_ttl: chrono::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: chrono::Duration::hours(1),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub account_id: AccountId,
    pub expires_at: DateTime<Utc>,
}

/// Verifies credentials and maps tokens back to accounts.
///
/// Tokens are stateless and not revocable; they expire after
/// [`AuthConfig::token_ttl`].
#[derive(Debug)]
pub struct AuthGate {
    store: Arc<AccountStore>,
    codec: TokenCodec,
    config: AuthConfig,
}

impl AuthGate {
    pub fn new(store: Arc<AccountStore>, secret: &[u8], config: AuthConfig) -> Self {
        Self {
            store,
            codec: TokenCodec::hs256(secret),
            config,
        }
    }

    pub fn store(&self) -> &Arc<AccountStore> {
        &self.store
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn register(
        &self,
        username: &str,
        password: &str,
        initial_balance: Amount,
        currency: Currency,
    ) -> DomainResult<AccountView> {
        self.store.create(username, password, initial_balance, currency)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> DomainResult<IssuedToken> {
        self.authenticate_at(username, password, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<IssuedToken> {
        let account_id = self.store.verify_credentials(username, password)?;

        let claims = SessionClaims::new(account_id, now, self.config.token_ttl);
        let token = self.codec.encode(&claims)?;

        debug!(account_id = %account_id, jti = %claims.jti, "session token issued");
        Ok(IssuedToken {
            token,
            account_id,
            expires_at: claims.expires_at,
        })
    }

    pub fn resolve(&self, token: &str) -> DomainResult<AccountId> {
        self.resolve_at(token, Utc::now())
    }

    /// Map a token to the account it was issued for.
    ///
    /// The account must still exist; a token never vouches for an id the
    /// store does not know.
    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> DomainResult<AccountId> {
        let claims = self.codec.decode(token)?;
        validate_claims(&claims, now)?;

        if !self.store.contains(claims.sub)? {
            return Err(DomainError::InvalidToken);
        }
        Ok(claims.sub)
    }
}
