use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::routes::run_blocking;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AccountContext;

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<dto::AmountRequest>,
) -> axum::response::Response {
    let amount = match body.amount() {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let id = account.account_id();

    match run_blocking(services, move |s| s.deposit(id, amount)).await {
        Ok(balance) => (StatusCode::OK, Json(dto::balance_to_json(id, balance))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<dto::AmountRequest>,
) -> axum::response::Response {
    let amount = match body.amount() {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let id = account.account_id();

    match run_blocking(services, move |s| s.withdraw(id, amount)).await {
        Ok(balance) => (StatusCode::OK, Json(dto::balance_to_json(id, balance))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    let (to, amount) = match body.to_account_id().and_then(|to| Ok((to, body.amount()?))) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let from = account.account_id();

    match run_blocking(services, move |s| s.transfer(from, to, amount)).await {
        Ok((from_balance, to_balance)) => (
            StatusCode::OK,
            Json(dto::transfer_to_json(from, to, from_balance, to_balance)),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
) -> axum::response::Response {
    let id = account.account_id();

    match run_blocking(services, move |s| s.balance(id)).await {
        Ok(view) => (StatusCode::OK, Json(dto::account_to_json(&view))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
