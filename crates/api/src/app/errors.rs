use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use minibank_core::DomainError;

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        DomainError::DuplicateUsername(_) => StatusCode::CONFLICT,
        DomainError::AuthenticationFailed
        | DomainError::InvalidToken
        | DomainError::TokenExpired => StatusCode::UNAUTHORIZED,
        DomainError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a core error onto the wire without second-guessing the core's decision.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
        // Internal details stay in the log.
        return json_error(status, err.code(), "internal error");
    }
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::{AccountId, Amount};

    #[test]
    fn maps_every_kind_to_its_class() {
        let cases = [
            (DomainError::invalid_argument("x"), StatusCode::BAD_REQUEST),
            (DomainError::duplicate_username("a"), StatusCode::CONFLICT),
            (DomainError::AuthenticationFailed, StatusCode::UNAUTHORIZED),
            (DomainError::InvalidToken, StatusCode::UNAUTHORIZED),
            (DomainError::TokenExpired, StatusCode::UNAUTHORIZED),
            (DomainError::AccountNotFound(AccountId::new(1)), StatusCode::NOT_FOUND),
            (
                DomainError::InsufficientFunds {
                    account_id: AccountId::new(1),
                    balance: Amount::ZERO,
                    requested: Amount::new(1),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DomainError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{err:?}");
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }
}
