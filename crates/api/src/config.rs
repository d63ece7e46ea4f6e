//! Process configuration read from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `MINIBANK_BIND_ADDR` | `0.0.0.0:8080` |
//! | `JWT_SECRET` | insecure development secret (warned about at startup) |
//! | `MINIBANK_TOKEN_TTL_SECS` | `3600` |
//! | `MINIBANK_LOG_FORMAT` | `json` (`json` or `pretty`) |
//! | `MINIBANK_LOG_FILTER` | `info` (overridden by `RUST_LOG`) |
//! | `MINIBANK_HASH_MEMORY_KIB` | `19456` |
//! | `MINIBANK_HASH_ITERATIONS` | `2` |
//! | `MINIBANK_RATE_LIMIT_ENABLED` | `true` |
//! | `MINIBANK_RATE_LIMIT_CREATE_PER_MIN` | `5` |
//! | `MINIBANK_RATE_LIMIT_LOGIN_PER_MIN` | `10` |
//! | `MINIBANK_RATE_LIMIT_MUTATION_PER_MIN` | `10` |
//! | `MINIBANK_RATE_LIMIT_STANDARD_PER_HOUR` | `50` |
//! | `MINIBANK_TRUST_PROXY_HEADERS` | `false` |

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use minibank_auth::AuthConfig;
use minibank_observability::{LogConfig, LogFormat};

use crate::rate_limit::{RateLimitConfig, RateLimitRule};

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: cannot parse '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Argon2 cost parameters for password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for Argon2id).
        Self {
            memory_kib: 19_456,
            iterations: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// True when `JWT_SECRET` was not provided.
    pub insecure_default_secret: bool,
    pub auth: AuthConfig,
    pub hash_cost: HashCost,
    pub log: LogConfig,
    pub rate_limits: RateLimitConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            insecure_default_secret: true,
            auth: AuthConfig::default(),
            hash_cost: HashCost::default(),
            log: LogConfig::default(),
            rate_limits: RateLimitConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parsed::<SocketAddr, _>(&lookup, "MINIBANK_BIND_ADDR")? {
            config.bind_addr = addr;
        }

        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            config.jwt_secret = secret;
            config.insecure_default_secret = false;
        }

        if let Some(secs) = parsed::<u32, _>(&lookup, "MINIBANK_TOKEN_TTL_SECS")? {
            if secs == 0 {
                return Err(invalid("MINIBANK_TOKEN_TTL_SECS", "0", "must be positive"));
            }
            config.auth.token_ttl = chrono::Duration::seconds(i64::from(secs));
        }

        if let Some(raw) = lookup("MINIBANK_LOG_FORMAT") {
            config.log.format = LogFormat::parse(&raw)
                .ok_or_else(|| invalid("MINIBANK_LOG_FORMAT", &raw, "expected json or pretty"))?;
        }
        if let Some(filter) = lookup("MINIBANK_LOG_FILTER") {
            config.log.default_filter = filter;
        }

        if let Some(kib) = parsed(&lookup, "MINIBANK_HASH_MEMORY_KIB")? {
            config.hash_cost.memory_kib = kib;
        }
        if let Some(iterations) = parsed(&lookup, "MINIBANK_HASH_ITERATIONS")? {
            config.hash_cost.iterations = iterations;
        }

        let limits = &mut config.rate_limits;
        if let Some(enabled) = parsed::<bool, _>(&lookup, "MINIBANK_RATE_LIMIT_ENABLED")? {
            limits.enabled = enabled;
        }
        if let Some(n) = parsed(&lookup, "MINIBANK_RATE_LIMIT_CREATE_PER_MIN")? {
            limits.create_account = RateLimitRule::per_minute(n);
        }
        if let Some(n) = parsed(&lookup, "MINIBANK_RATE_LIMIT_LOGIN_PER_MIN")? {
            limits.login = RateLimitRule::per_minute(n);
        }
        if let Some(n) = parsed(&lookup, "MINIBANK_RATE_LIMIT_MUTATION_PER_MIN")? {
            limits.mutation = RateLimitRule::per_minute(n);
        }
        if let Some(n) = parsed(&lookup, "MINIBANK_RATE_LIMIT_STANDARD_PER_HOUR")? {
            limits.standard = RateLimitRule::per_hour(n);
        }
        if let Some(trust) = parsed::<bool, _>(&lookup, "MINIBANK_TRUST_PROXY_HEADERS")? {
            limits.trust_proxy_headers = trust;
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parsed<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, &raw, e.to_string())),
    }
}
