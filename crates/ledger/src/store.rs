//! The account store: arena of accounts plus the locking discipline that keeps
//! balances non-negative and transfers atomic under concurrent access.
//!
//! Two lock levels:
//! - a registry `RwLock` over the id counter, the id map and the username
//!   index (held briefly, never while waiting on an account)
//! - one `Mutex` per account balance
//!
//! Multi-account paths always take account locks in ascending id order.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use minibank_core::{AccountId, Amount, Currency, DomainError, DomainResult};

use crate::account::{AccountSlot, AccountView, lock_pair};
use crate::secret::SecretHasher;

#[derive(Debug)]
struct Registry {
    next_id: AccountId,
    accounts: BTreeMap<AccountId, Arc<AccountSlot>>,
    by_username: HashMap<String, AccountId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            next_id: AccountId::FIRST,
            accounts: BTreeMap::new(),
            by_username: HashMap::new(),
        }
    }
}

/// In-memory ledger of accounts.
///
/// Callers never coordinate locking themselves; every operation is safe to
/// call from any number of threads.
#[derive(Debug)]
pub struct AccountStore {
    registry: RwLock<Registry>,
    hasher: SecretHasher,
}

impl AccountStore {
    pub fn with_hasher(hasher: SecretHasher) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            hasher,
        }
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Registry>> {
        self.registry
            .read()
            .map_err(|_| DomainError::internal("account registry lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Registry>> {
        self.registry
            .write()
            .map_err(|_| DomainError::internal("account registry lock poisoned"))
    }

    fn slot(&self, id: AccountId) -> DomainResult<Arc<AccountSlot>> {
        self.read()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or(DomainError::AccountNotFound(id))
    }

    /// Open a new account.
    ///
    /// The password is hashed before the registry is locked; the duplicate
    /// check and the insert then happen under one write lock, so two
    /// concurrent creates for the same username cannot both succeed.
    pub fn create(
        &self,
        username: &str,
        password: &str,
        initial_balance: Amount,
        currency: Currency,
    ) -> DomainResult<AccountView> {
        if username.trim().is_empty() {
            return Err(DomainError::invalid_argument("username is required"));
        }
        if password.is_empty() {
            return Err(DomainError::invalid_argument("password is required"));
        }
        if initial_balance.is_negative() {
            return Err(DomainError::invalid_argument(
                "initial balance must not be negative",
            ));
        }

        // Skip the expensive hash for the common duplicate case.
        if self.read()?.by_username.contains_key(username) {
            return Err(DomainError::duplicate_username(username));
        }

        let secret_hash = self.hasher.hash(password)?;

        let mut registry = self.write()?;
        if registry.by_username.contains_key(username) {
            return Err(DomainError::duplicate_username(username));
        }

        let id = registry.next_id;
        registry.next_id = id.next();

        let slot = Arc::new(AccountSlot::new(
            id,
            username.to_string(),
            currency,
            secret_hash,
            initial_balance,
        ));
        let view = slot.view(initial_balance);

        registry.by_username.insert(username.to_string(), id);
        registry.accounts.insert(id, slot);

        debug!(account_id = %id, username, "account created");
        Ok(view)
    }

    /// Resolve a username/password pair to its account.
    pub fn verify_credentials(&self, username: &str, password: &str) -> DomainResult<AccountId> {
        let slot = {
            let registry = self.read()?;
            registry
                .by_username
                .get(username)
                .and_then(|id| registry.accounts.get(id))
                .cloned()
        };

        match slot {
            Some(slot) if self.hasher.verify(password, &slot.secret_hash) => Ok(slot.id),
            Some(_) => Err(DomainError::AuthenticationFailed),
            None => {
                self.hasher.verify_decoy(password);
                Err(DomainError::AuthenticationFailed)
            }
        }
    }

    pub fn contains(&self, id: AccountId) -> DomainResult<bool> {
        Ok(self.read()?.accounts.contains_key(&id))
    }

    pub fn len(&self) -> DomainResult<usize> {
        Ok(self.read()?.accounts.len())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Current state of one account.
    pub fn balance(&self, id: AccountId) -> DomainResult<AccountView> {
        let slot = self.slot(id)?;
        let balance = *slot.lock()?;
        Ok(slot.view(balance))
    }

    pub fn deposit(&self, id: AccountId, amount: Amount) -> DomainResult<Amount> {
        let slot = self.slot(id)?;
        let amount = amount.ensure_positive()?;

        let mut balance = slot.lock()?;
        let next = balance
            .checked_add(amount)
            .ok_or_else(|| DomainError::invalid_argument("deposit would overflow the balance"))?;
        *balance = next;

        Ok(next)
    }

    pub fn withdraw(&self, id: AccountId, amount: Amount) -> DomainResult<Amount> {
        let slot = self.slot(id)?;
        let amount = amount.ensure_positive()?;

        let mut balance = slot.lock()?;
        if *balance < amount {
            return Err(DomainError::InsufficientFunds {
                account_id: id,
                balance: *balance,
                requested: amount,
            });
        }
        let next = balance
            .checked_sub(amount)
            .ok_or_else(|| DomainError::internal("withdraw underflow"))?;
        *balance = next;

        Ok(next)
    }

    /// Move `amount` from one account to another as a single atomic step.
    ///
    /// Both ids are resolved before anything is locked or mutated. Returns the
    /// resulting `(from_balance, to_balance)`.
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> DomainResult<(Amount, Amount)> {
        let (source, destination) = {
            let registry = self.read()?;
            let source = registry.accounts.get(&from).cloned();
            let destination = registry.accounts.get(&to).cloned();
            (
                source.ok_or(DomainError::AccountNotFound(from))?,
                destination.ok_or(DomainError::AccountNotFound(to))?,
            )
        };

        let amount = amount.ensure_positive()?;
        if from == to {
            return Err(DomainError::invalid_argument(
                "cannot transfer to the same account",
            ));
        }
        if source.currency != destination.currency {
            return Err(DomainError::invalid_argument(format!(
                "currency mismatch: {} -> {}",
                source.currency, destination.currency
            )));
        }

        let (mut from_balance, mut to_balance) = lock_pair(&source, &destination)?;

        if *from_balance < amount {
            return Err(DomainError::InsufficientFunds {
                account_id: from,
                balance: *from_balance,
                requested: amount,
            });
        }

        // Compute both sides before writing either.
        let next_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| DomainError::invalid_argument("transfer would overflow the destination"))?;
        let next_from = from_balance
            .checked_sub(amount)
            .ok_or_else(|| DomainError::internal("transfer underflow"))?;

        *from_balance = next_from;
        *to_balance = next_to;

        Ok((next_from, next_to))
    }

    /// Consistent view of every account.
    ///
    /// Holds all account locks at once (taken in ascending id order), so no
    /// transfer can be observed half-applied.
    pub fn snapshot(&self) -> DomainResult<Vec<AccountView>> {
        let slots: Vec<Arc<AccountSlot>> = self.read()?.accounts.values().cloned().collect();

        let mut guards = Vec::with_capacity(slots.len());
        for slot in &slots {
            guards.push(slot.lock()?);
        }

        Ok(slots
            .iter()
            .zip(guards.iter())
            .map(|(slot, balance)| slot.view(**balance))
            .collect())
    }

    /// Sum of all balances, taken from a consistent snapshot.
    pub fn total_balance(&self) -> DomainResult<Amount> {
        self.snapshot()?
            .iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a.balance))
            .ok_or_else(|| DomainError::internal("total balance overflow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::Params;
    use proptest::prelude::*;

    fn store() -> AccountStore {
        AccountStore::with_hasher(SecretHasher::with_cost(Params::MIN_M_COST, 1).unwrap())
    }

    fn open(store: &AccountStore, name: &str, balance: i64) -> AccountId {
        store
            .create(name, "pw", Amount::new(balance), Currency::usd())
            .unwrap()
            .id
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let store = store();
        let ids: Vec<_> = ["a", "b", "c"].iter().map(|n| open(&store, n, 0)).collect();
        assert_eq!(
            ids,
            vec![AccountId::new(1), AccountId::new(2), AccountId::new(3)]
        );
    }

    #[test]
    fn create_returns_public_fields() {
        let store = store();
        let view = store
            .create("alice", "pw", Amount::new(100), Currency::parse("eur").unwrap())
            .unwrap();
        assert_eq!(view.username, "alice");
        assert_eq!(view.balance, Amount::new(100));
        assert_eq!(view.currency.as_str(), "EUR");
    }

    #[test]
    fn duplicate_username_is_rejected_without_side_effects() {
        let store = store();
        let first = open(&store, "alice", 10);

        let err = store
            .create("alice", "other", Amount::new(99), Currency::usd())
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateUsername("alice".into()));

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.balance(first).unwrap().balance, Amount::new(10));
        // The failed create did not burn an id.
        assert_eq!(open(&store, "bob", 0), AccountId::new(2));
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let store = store();
        open(&store, "alice", 0);
        assert!(store.create("Alice", "pw", Amount::ZERO, Currency::usd()).is_ok());
    }

    #[test]
    fn create_validates_inputs() {
        let store = store();
        for (user, pw, bal) in [("", "pw", 0), ("   ", "pw", 0), ("u", "", 0), ("u", "pw", -1)] {
            let err = store
                .create(user, pw, Amount::new(bal), Currency::usd())
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)), "{user:?} {pw:?} {bal}");
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn verify_credentials_checks_password() {
        let store = store();
        let id = open(&store, "alice", 0);

        assert_eq!(store.verify_credentials("alice", "pw").unwrap(), id);
        assert_eq!(
            store.verify_credentials("alice", "nope").unwrap_err(),
            DomainError::AuthenticationFailed
        );
        assert_eq!(
            store.verify_credentials("mallory", "pw").unwrap_err(),
            DomainError::AuthenticationFailed
        );
    }

    #[test]
    fn deposit_adds_exact_amount() {
        let store = store();
        let id = open(&store, "alice", 100);
        assert_eq!(store.deposit(id, Amount::new(50)).unwrap(), Amount::new(150));
        assert_eq!(store.balance(id).unwrap().balance, Amount::new(150));
    }

    #[test]
    fn non_positive_deposit_leaves_balance_alone() {
        let store = store();
        let id = open(&store, "alice", 100);
        for bad in [0, -1, -100] {
            assert!(matches!(
                store.deposit(id, Amount::new(bad)),
                Err(DomainError::InvalidArgument(_))
            ));
        }
        assert_eq!(store.balance(id).unwrap().balance, Amount::new(100));
    }

    #[test]
    fn deposit_overflow_is_rejected() {
        let store = store();
        let id = open(&store, "whale", i64::MAX);
        assert!(matches!(
            store.deposit(id, Amount::new(1)),
            Err(DomainError::InvalidArgument(_))
        ));
        assert_eq!(store.balance(id).unwrap().balance, Amount::new(i64::MAX));
    }

    #[test]
    fn unknown_account_is_not_found() {
        let store = store();
        let ghost = AccountId::new(99);
        assert_eq!(
            store.deposit(ghost, Amount::new(1)).unwrap_err(),
            DomainError::AccountNotFound(ghost)
        );
        assert_eq!(
            store.withdraw(ghost, Amount::new(1)).unwrap_err(),
            DomainError::AccountNotFound(ghost)
        );
        assert!(!store.contains(ghost).unwrap());
    }

    #[test]
    fn overdraw_fails_and_exact_withdraw_empties() {
        let store = store();
        let id = open(&store, "alice", 100);

        let err = store.withdraw(id, Amount::new(101)).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientFunds { .. }));
        assert_eq!(store.balance(id).unwrap().balance, Amount::new(100));

        assert_eq!(store.withdraw(id, Amount::new(100)).unwrap(), Amount::ZERO);
    }

    #[test]
    fn transfer_moves_funds() {
        let store = store();
        let a = open(&store, "alice", 100);
        let b = open(&store, "bob", 5);

        assert_eq!(
            store.transfer(a, b, Amount::new(30)).unwrap(),
            (Amount::new(70), Amount::new(35))
        );
        // Reverse direction goes through the same lock order.
        assert_eq!(
            store.transfer(b, a, Amount::new(35)).unwrap(),
            (Amount::ZERO, Amount::new(105))
        );
    }

    #[test]
    fn transfer_rejections_do_not_mutate() {
        let store = store();
        let a = open(&store, "alice", 100);
        let b = open(&store, "bob", 0);
        let ghost = AccountId::new(42);

        assert_eq!(
            store.transfer(a, ghost, Amount::new(1)).unwrap_err(),
            DomainError::AccountNotFound(ghost)
        );
        assert_eq!(
            store.transfer(ghost, a, Amount::new(1)).unwrap_err(),
            DomainError::AccountNotFound(ghost)
        );
        assert!(matches!(
            store.transfer(a, a, Amount::new(1)),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.transfer(a, b, Amount::ZERO),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.transfer(a, b, Amount::new(101)),
            Err(DomainError::InsufficientFunds { .. })
        ));

        assert_eq!(store.balance(a).unwrap().balance, Amount::new(100));
        assert_eq!(store.balance(b).unwrap().balance, Amount::ZERO);
    }

    #[test]
    fn transfer_between_currencies_is_rejected() {
        let store = store();
        let usd = open(&store, "alice", 100);
        let eur = store
            .create("bob", "pw", Amount::ZERO, Currency::parse("EUR").unwrap())
            .unwrap()
            .id;

        assert!(matches!(
            store.transfer(usd, eur, Amount::new(1)),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn snapshot_is_in_id_order() {
        let store = store();
        open(&store, "a", 1);
        open(&store, "b", 2);
        open(&store, "c", 3);

        let snap = store.snapshot().unwrap();
        let ids: Vec<_> = snap.iter().map(|a| a.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.total_balance().unwrap(), Amount::new(6));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of transfers conserves the pair total and
        /// debits the source by exactly the amount moved.
        #[test]
        fn transfers_conserve_value(
            start in (0i64..10_000, 0i64..10_000),
            moves in prop::collection::vec((any::<bool>(), -5i64..2_000), 1..40)
        ) {
            let store = store();
            let x = open(&store, "x", start.0);
            let y = open(&store, "y", start.1);
            let total = start.0 + start.1;

            for (forward, amount) in moves {
                let (from, to) = if forward { (x, y) } else { (y, x) };
                let before_from = store.balance(from).unwrap().balance;
                let before_to = store.balance(to).unwrap().balance;

                match store.transfer(from, to, Amount::new(amount)) {
                    Ok((after_from, after_to)) => {
                        prop_assert_eq!(after_from.minor_units(), before_from.minor_units() - amount);
                        prop_assert_eq!(
                            after_from.minor_units() + after_to.minor_units(),
                            before_from.minor_units() + before_to.minor_units()
                        );
                    }
                    Err(_) => {
                        prop_assert_eq!(store.balance(from).unwrap().balance, before_from);
                        prop_assert_eq!(store.balance(to).unwrap().balance, before_to);
                    }
                }

                prop_assert!(!store.balance(x).unwrap().balance.is_negative());
                prop_assert!(!store.balance(y).unwrap().balance.is_negative());
            }

            prop_assert_eq!(store.total_balance().unwrap().minor_units(), total);
        }
    }
}
