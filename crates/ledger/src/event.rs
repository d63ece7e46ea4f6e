use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use minibank_core::{AccountId, Amount, Currency};
use minibank_events::Event;

/// Event: an account was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOpened {
    pub account_id: AccountId,
    pub username: String,
    pub initial_balance: Amount,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
}

/// Event: funds were added to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub account_id: AccountId,
    pub amount: Amount,
    pub balance: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Event: funds were taken out of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub account_id: AccountId,
    pub amount: Amount,
    pub balance: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Event: funds moved between two accounts in one atomic step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Amount,
    pub from_balance: Amount,
    pub to_balance: Amount,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    AccountOpened(AccountOpened),
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    Transferred(Transferred),
}

impl LedgerEvent {
    /// Amount moved by the mutation (initial balance for openings).
    pub fn amount(&self) -> Amount {
        match self {
            LedgerEvent::AccountOpened(e) => e.initial_balance,
            LedgerEvent::Deposited(e) => e.amount,
            LedgerEvent::Withdrawn(e) => e.amount,
            LedgerEvent::Transferred(e) => e.amount,
        }
    }
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::AccountOpened(_) => "ledger.account_opened",
            LedgerEvent::Deposited(_) => "ledger.deposited",
            LedgerEvent::Withdrawn(_) => "ledger.withdrawn",
            LedgerEvent::Transferred(_) => "ledger.transferred",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::AccountOpened(e) => e.occurred_at,
            LedgerEvent::Deposited(e) => e.occurred_at,
            LedgerEvent::Withdrawn(e) => e.occurred_at,
            LedgerEvent::Transferred(e) => e.occurred_at,
        }
    }

    fn subjects(&self) -> Vec<AccountId> {
        match self {
            LedgerEvent::AccountOpened(e) => vec![e.account_id],
            LedgerEvent::Deposited(e) => vec![e.account_id],
            LedgerEvent::Withdrawn(e) => vec![e.account_id],
            LedgerEvent::Transferred(e) => vec![e.from_account_id, e.to_account_id],
        }
    }
}
