use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use minibank_core::{DomainError, DomainResult};

use crate::app::services::AppServices;

pub mod accounts;
pub mod ledger;
pub mod system;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/create_account", post(accounts::create_account))
        .route("/login", post(accounts::login))
        .route("/health", get(system::health))
        .route("/openapi.json", get(system::openapi))
}

/// Endpoints that act on the caller's own account.
pub fn protected_router() -> Router {
    Router::new()
        .route("/deposit", post(ledger::deposit))
        .route("/withdraw", post(ledger::withdraw))
        .route("/transfer", post(ledger::transfer))
        .route("/balance", get(ledger::balance))
}

/// Run a store call off the async workers.
///
/// Password hashing is CPU bound and store calls may block on account locks.
pub(crate) async fn run_blocking<T, F>(services: Arc<AppServices>, f: F) -> DomainResult<T>
where
    T: Send + 'static,
    F: FnOnce(&AppServices) -> DomainResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&services))
        .await
        .map_err(|e| DomainError::internal(format!("blocking task failed: {e}")))?
}
