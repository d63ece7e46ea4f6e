//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, auth gate and event bus behind one handle
//! - `routes/`: HTTP handlers (accounts, ledger, system)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `audit.rs`: background audit trail fed by the event bus

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tracing::info;

use minibank_auth::AuthGate;
use minibank_ledger::{AccountStore, SecretHasher};

use crate::config::ApiConfig;
use crate::middleware;
use crate::rate_limit::RateLimiter;

pub mod audit;
pub mod dto;
pub mod errors;
pub mod openapi;
pub mod routes;
pub mod services;

/// A wired application: the router to serve and the audit worker behind it.
///
/// Serve `router`, then call [`audit::WorkerHandle::shutdown`] on `audit` so
/// every committed mutation reaches the audit trail before exit.
#[derive(Debug)]
pub struct App {
    pub router: Router,
    pub audit: audit::WorkerHandle,
}

/// Build the full application (public entrypoint used by `main.rs`).
///
/// Each call gets its own empty store, so tests can build independent apps.
pub fn build_app(config: &ApiConfig) -> anyhow::Result<App> {
    let hasher = SecretHasher::with_cost(config.hash_cost.memory_kib, config.hash_cost.iterations)
        .context("invalid password hashing parameters")?;
    let store = Arc::new(AccountStore::with_hasher(hasher));
    let gate = AuthGate::new(store, config.jwt_secret.as_bytes(), config.auth.clone());
    let bus = Arc::new(services::LedgerBus::new());

    let audit = audit::AuditWorker::spawn("minibank-audit", bus.as_ref(), audit::record)
        .context("failed to start audit worker")?;

    let services = Arc::new(services::AppServices::new(gate, bus));
    let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));
    info!(
        rate_limiting = limiter.config().enabled,
        token_ttl_secs = config.auth.token_ttl.num_seconds(),
        "application wired"
    );

    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    // Protected routes: require a bearer token that resolves to an account.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let router = routes::public_router().merge(protected).layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ))
            .layer(Extension(services)),
    );

    Ok(App { router, audit })
}
