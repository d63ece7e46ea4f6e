//! Strongly-typed identifiers used across the ledger.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an account.
///
/// Ids are handed out by the account store starting at 1 and are never
/// reused, so they double as a stable global lock order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl AccountId {
    /// First id a fresh store assigns.
    pub const FIRST: AccountId = AccountId(1);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for AccountId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<AccountId> for u64 {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl FromStr for AccountId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_argument(format!("AccountId: {e}")))?;
        if raw == 0 {
            return Err(DomainError::invalid_argument("AccountId: ids start at 1"));
        }
        Ok(Self(raw))
    }
}
