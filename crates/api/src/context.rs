use minibank_core::AccountId;

/// Account context for an authenticated request.
///
/// Inserted by the auth middleware after the bearer token resolved to an
/// account that still exists. Handlers never read the account id from the
/// request body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccountContext {
    account_id: AccountId,
}

impl AccountContext {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }
}
