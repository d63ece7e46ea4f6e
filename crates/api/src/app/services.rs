//! Service wiring between HTTP handlers and the ledger core.
//!
//! Each successful mutation is published on the event bus after the store has
//! applied it; a failed publish is logged and never undoes the mutation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use minibank_auth::{AuthGate, IssuedToken};
use minibank_core::{AccountId, Amount, Currency, DomainError, DomainResult};
use minibank_events::{Event, EventBus, InMemoryEventBus};
use minibank_ledger::{
    AccountOpened, AccountStore, AccountView, Deposited, LedgerEvent, Transferred, Withdrawn,
};

pub type LedgerBus = InMemoryEventBus<LedgerEvent>;

#[derive(Debug)]
pub struct AppServices {
    gate: AuthGate,
    bus: Arc<LedgerBus>,
}

impl AppServices {
    pub fn new(gate: AuthGate, bus: Arc<LedgerBus>) -> Self {
        Self { gate, bus }
    }

    pub fn store(&self) -> &AccountStore {
        self.gate.store()
    }

    pub fn bus(&self) -> &Arc<LedgerBus> {
        &self.bus
    }

    fn publish(&self, event: LedgerEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.bus.publish(event) {
            warn!(event_type, error = %e, "failed to publish ledger event");
        }
    }

    pub fn create_account(
        &self,
        username: &str,
        password: &str,
        initial_balance: Amount,
        currency: Currency,
    ) -> DomainResult<AccountView> {
        let view = self
            .gate
            .register(username, password, initial_balance, currency)?;

        self.publish(LedgerEvent::AccountOpened(AccountOpened {
            account_id: view.id,
            username: view.username.clone(),
            initial_balance: view.balance,
            currency: view.currency.clone(),
            occurred_at: Utc::now(),
        }));
        Ok(view)
    }

    pub fn login(&self, username: &str, password: &str) -> DomainResult<IssuedToken> {
        match self.gate.authenticate(username, password) {
            Ok(issued) => {
                info!(event = "auth.success", account_id = %issued.account_id, "user authenticated");
                Ok(issued)
            }
            Err(e) => {
                if matches!(e, DomainError::AuthenticationFailed) {
                    warn!(event = "auth.failed", username, "authentication failed");
                }
                Err(e)
            }
        }
    }

    pub fn resolve(&self, token: &str) -> DomainResult<AccountId> {
        self.gate.resolve(token)
    }

    pub fn balance(&self, account_id: AccountId) -> DomainResult<AccountView> {
        self.store().balance(account_id)
    }

    pub fn deposit(&self, account_id: AccountId, amount: Amount) -> DomainResult<Amount> {
        let balance = self.store().deposit(account_id, amount)?;
        self.publish(LedgerEvent::Deposited(Deposited {
            account_id,
            amount,
            balance,
            occurred_at: Utc::now(),
        }));
        Ok(balance)
    }

    pub fn withdraw(&self, account_id: AccountId, amount: Amount) -> DomainResult<Amount> {
        let balance = self.store().withdraw(account_id, amount)?;
        self.publish(LedgerEvent::Withdrawn(Withdrawn {
            account_id,
            amount,
            balance,
            occurred_at: Utc::now(),
        }));
        Ok(balance)
    }

    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> DomainResult<(Amount, Amount)> {
        let (from_balance, to_balance) = self.store().transfer(from, to, amount)?;
        self.publish(LedgerEvent::Transferred(Transferred {
            from_account_id: from,
            to_account_id: to,
            amount,
            from_balance,
            to_balance,
            occurred_at: Utc::now(),
        }));
        Ok((from_balance, to_balance))
    }
}
