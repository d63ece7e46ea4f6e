use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use minibank_core::DomainError;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::AccountContext;
use crate::rate_limit::{RateLimitError, RateLimiter, RouteClass};

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let account_id = match state.services.resolve(token) {
        Ok(id) => id,
        Err(e) => {
            debug!(error = %e, "bearer token rejected");
            return errors::domain_error_to_response(e);
        }
    };

    req.extensions_mut().insert(AccountContext::new(account_id));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, DomainError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(DomainError::InvalidToken)?;

    let header = header.to_str().map_err(|_| DomainError::InvalidToken)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(DomainError::InvalidToken)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(DomainError::InvalidToken);
    }

    Ok(token)
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let class = RouteClass::from_path(req.uri().path());
    let client = client_key(&req, limiter.config().trust_proxy_headers);

    match limiter.check(class, &client) {
        Ok(status) => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(status.limit));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(status.remaining));
            headers.insert("x-ratelimit-window", HeaderValue::from(status.window_secs));
            response
        }
        Err(RateLimitError::Exceeded {
            limit,
            retry_after_secs,
        }) => {
            warn!(
                client = %client,
                route_class = class.as_str(),
                limit,
                "rate limit exceeded"
            );
            let mut response = errors::json_error(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                format!("too many requests; retry in {retry_after_secs}s"),
            );
            let headers = response.headers_mut();
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(0u32));
            response
        }
        Err(e @ RateLimitError::Poisoned) => {
            errors::domain_error_to_response(DomainError::internal(e.to_string()))
        }
    }
}

/// Identify the caller by peer address.
///
/// With `trust_proxy` set, the first hop of `X-Forwarded-For` and then
/// `X-Real-IP` win over the peer, but only when they parse as an IP.
pub fn client_key<B>(req: &axum::http::Request<B>, trust_proxy: bool) -> String {
    if trust_proxy {
        let headers = req.headers();
        let ip = header_ip(headers, "x-forwarded-for").or_else(|| header_ip(headers, "x-real-ip"));
        if let Some(ip) = ip {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// First comma-separated entry of `name`, if it is an address.
fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    let raw = headers.get(name)?.to_str().ok()?;
    raw.split(',').next()?.trim().parse().ok()
}
