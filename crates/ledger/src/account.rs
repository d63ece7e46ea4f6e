use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use minibank_core::{AccountId, Amount, Currency, DomainError, DomainResult};

/// Public, copyable view of an account at one instant.
///
/// Never carries the secret hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub username: String,
    pub balance: Amount,
    pub currency: Currency,
}

/// Store-owned account record.
///
/// Everything except the balance is immutable after creation, so only the
/// balance sits behind the per-account lock.
#[derive(Debug)]
pub(crate) struct AccountSlot {
    pub(crate) id: AccountId,
    pub(crate) username: String,
    pub(crate) currency: Currency,
    pub(crate) secret_hash: String,
    balance: Mutex<Amount>,
}

impl AccountSlot {
    pub(crate) fn new(
        id: AccountId,
        username: String,
        currency: Currency,
        secret_hash: String,
        balance: Amount,
    ) -> Self {
        Self {
            id,
            username,
            currency,
            secret_hash,
            balance: Mutex::new(balance),
        }
    }

    /// Exclusive access to this account's balance.
    pub(crate) fn lock(&self) -> DomainResult<MutexGuard<'_, Amount>> {
        self.balance
            .lock()
            .map_err(|_| DomainError::internal(format!("account {} lock poisoned", self.id)))
    }

    pub(crate) fn view(&self, balance: Amount) -> AccountView {
        AccountView {
            id: self.id,
            username: self.username.clone(),
            balance,
            currency: self.currency.clone(),
        }
    }
}

/// Lock two distinct accounts in ascending id order.
///
/// Guards come back in argument order. Every multi-account path goes through
/// here, so concurrent A→B and B→A transfers can never wait on each other in
/// a cycle.
pub(crate) fn lock_pair<'a>(
    a: &'a AccountSlot,
    b: &'a AccountSlot,
) -> DomainResult<(MutexGuard<'a, Amount>, MutexGuard<'a, Amount>)> {
    debug_assert_ne!(a.id, b.id);
    if a.id < b.id {
        let ga = a.lock()?;
        let gb = b.lock()?;
        Ok((ga, gb))
    } else {
        let gb = b.lock()?;
        let ga = a.lock()?;
        Ok((ga, gb))
    }
}
