use chrono::{DateTime, Utc};
use serde::Deserialize;

use minibank_core::{AccountId, Amount, Currency, DomainError, DomainResult};
use minibank_ledger::AccountView;

// -------------------------
// Request DTOs
// -------------------------

// Missing strings deserialize as empty so the core reports them as
// `invalid_argument` instead of the extractor rejecting the body.

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub initial_balance: Option<i64>,
    pub currency: Option<String>,
}

impl CreateAccountRequest {
    pub fn initial_balance(&self) -> Amount {
        Amount::new(self.initial_balance.unwrap_or(0))
    }

    pub fn currency(&self) -> DomainResult<Currency> {
        match self.currency.as_deref() {
            Some(code) => Currency::parse(code),
            None => Ok(Currency::default()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Option<i64>,
}

impl AmountRequest {
    pub fn amount(&self) -> DomainResult<Amount> {
        required_amount(self.amount)
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub to_account_id: Option<u64>,
    pub amount: Option<i64>,
}

impl TransferRequest {
    pub fn to_account_id(&self) -> DomainResult<AccountId> {
        self.to_account_id
            .map(AccountId::new)
            .ok_or_else(|| DomainError::invalid_argument("to_account_id is required"))
    }

    pub fn amount(&self) -> DomainResult<Amount> {
        required_amount(self.amount)
    }
}

fn required_amount(amount: Option<i64>) -> DomainResult<Amount> {
    amount
        .map(Amount::new)
        .ok_or_else(|| DomainError::invalid_argument("amount is required"))
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn created_account_to_json(view: &AccountView) -> serde_json::Value {
    serde_json::json!({
        "account_id": view.id,
        "balance": view.balance,
        "currency": view.currency,
    })
}

pub fn account_to_json(view: &AccountView) -> serde_json::Value {
    serde_json::json!({
        "account_id": view.id,
        "username": view.username,
        "balance": view.balance,
        "currency": view.currency,
    })
}

pub fn token_to_json(token: &str, expires_at: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "expires_at": expires_at.to_rfc3339(),
    })
}

pub fn balance_to_json(account_id: AccountId, balance: Amount) -> serde_json::Value {
    serde_json::json!({
        "account_id": account_id,
        "balance": balance,
    })
}

pub fn transfer_to_json(
    from: AccountId,
    to: AccountId,
    from_balance: Amount,
    to_balance: Amount,
) -> serde_json::Value {
    serde_json::json!({
        "from_account_id": from,
        "to_account_id": to,
        "from_balance": from_balance,
        "to_balance": to_balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults() {
        let req: CreateAccountRequest =
            serde_json::from_str(r#"{"username":"alice","password":"pw"}"#).unwrap();
        assert_eq!(req.initial_balance(), Amount::ZERO);
        assert_eq!(req.currency().unwrap(), Currency::usd());
    }

    #[test]
    fn missing_fields_become_invalid_arguments() {
        let req: CreateAccountRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_empty());

        let amount: AmountRequest = serde_json::from_str("{}").unwrap();
        assert!(matches!(amount.amount(), Err(DomainError::InvalidArgument(_))));

        let transfer: TransferRequest = serde_json::from_str(r#"{"amount":5}"#).unwrap();
        assert!(matches!(
            transfer.to_account_id(),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn created_account_json_hides_username_and_hash() {
        let view = AccountView {
            id: AccountId::new(1),
            username: "alice".into(),
            balance: Amount::new(100),
            currency: Currency::usd(),
        };
        let json = created_account_to_json(&view);
        assert_eq!(
            json,
            serde_json::json!({"account_id": 1, "balance": 100, "currency": "USD"})
        );
    }
}
