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

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateAccountRequest>,
) -> axum::response::Response {
    let currency = match body.currency() {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let initial_balance = body.initial_balance();

    let result = run_blocking(services, move |s| {
        s.create_account(&body.username, &body.password, initial_balance, currency)
    })
    .await;

    match result {
        Ok(view) => (
            StatusCode::CREATED,
            Json(dto::created_account_to_json(&view)),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let result = run_blocking(services, move |s| s.login(&body.username, &body.password)).await;

    match result {
        Ok(issued) => (
            StatusCode::OK,
            Json(dto::token_to_json(&issued.token, issued.expires_at)),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
