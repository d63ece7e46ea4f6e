//! Per-client request budgets.
//!
//! Sliding-window counters keyed by `(route class, client)`. Independent of
//! ledger state: a rejected request never reaches the store.
//!
//! | class | default budget |
//! |---|---|
//! | account creation | 5 / minute |
//! | login | 10 / minute |
//! | balance mutations | 10 / minute |
//! | everything else | 50 / hour |

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

/// Entries kept before idle clients are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Which budget a request draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    CreateAccount,
    Login,
    Mutation,
    Standard,
}

impl RouteClass {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/create_account" => Self::CreateAccount,
            "/login" => Self::Login,
            "/deposit" | "/withdraw" | "/transfer" => Self::Mutation,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateAccount => "create_account",
            Self::Login => "login",
            Self::Mutation => "mutation",
            Self::Standard => "standard",
        }
    }
}

/// Budget for one route class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub max_requests: usize,
    pub window: Duration,
}

impl RateLimitRule {
    pub const fn per_minute(max_requests: usize) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }

    pub const fn per_hour(max_requests: usize) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// When false every request is admitted.
    pub enabled: bool,
    pub create_account: RateLimitRule,
    pub login: RateLimitRule,
    pub mutation: RateLimitRule,
    pub standard: RateLimitRule,
    /// Key clients on `X-Forwarded-For` / `X-Real-IP` instead of the peer
    /// address. Only safe behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            create_account: RateLimitRule::per_minute(5),
            login: RateLimitRule::per_minute(10),
            mutation: RateLimitRule::per_minute(10),
            standard: RateLimitRule::per_hour(50),
            trust_proxy_headers: false,
        }
    }
}

impl RateLimitConfig {
    pub fn rule(&self, class: RouteClass) -> RateLimitRule {
        match class {
            RouteClass::CreateAccount => self.create_account,
            RouteClass::Login => self.login,
            RouteClass::Mutation => self.mutation,
            RouteClass::Standard => self.standard,
        }
    }
}

/// Remaining budget after an admitted request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: usize,
    pub remaining: usize,
    pub window_secs: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("rate limit of {limit} requests exceeded; retry in {retry_after_secs}s")]
    Exceeded { limit: usize, retry_after_secs: u64 },

    #[error("rate limiter state poisoned")]
    Poisoned,
}

type Key = (RouteClass, String);

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    hits: Mutex<HashMap<Key, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn check(&self, class: RouteClass, client: &str) -> Result<RateLimitStatus, RateLimitError> {
        self.check_at(class, client, Instant::now())
    }

    /// Record one request at `now` and decide whether it is admitted.
    pub fn check_at(
        &self,
        class: RouteClass,
        client: &str,
        now: Instant,
    ) -> Result<RateLimitStatus, RateLimitError> {
        let rule = self.config.rule(class);
        if !self.config.enabled {
            return Ok(RateLimitStatus {
                limit: rule.max_requests,
                remaining: rule.max_requests,
                window_secs: rule.window.as_secs(),
            });
        }

        let mut hits = self.hits.lock().map_err(|_| RateLimitError::Poisoned)?;

        if hits.len() >= SWEEP_THRESHOLD {
            let config = &self.config;
            hits.retain(|(c, _), q| {
                q.back()
                    .is_some_and(|t| now.duration_since(*t) < config.rule(*c).window)
            });
        }

        let window = hits.entry((class, client.to_string())).or_default();
        while window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= rule.window)
        {
            window.pop_front();
        }

        if window.len() >= rule.max_requests {
            let retry_after = window
                .front()
                .map(|oldest| rule.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(rule.window);
            return Err(RateLimitError::Exceeded {
                limit: rule.max_requests,
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }

        window.push_back(now);

        Ok(RateLimitStatus {
            limit: rule.max_requests,
            remaining: rule.max_requests - window.len(),
            window_secs: rule.window.as_secs(),
        })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight() -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            login: RateLimitRule {
                max_requests: 2,
                window: Duration::from_secs(60),
            },
            ..RateLimitConfig::default()
        })
    }

    #[test]
    fn classifies_paths() {
        assert_eq!(RouteClass::from_path("/create_account"), RouteClass::CreateAccount);
        assert_eq!(RouteClass::from_path("/login"), RouteClass::Login);
        assert_eq!(RouteClass::from_path("/transfer/"), RouteClass::Mutation);
        assert_eq!(RouteClass::from_path("/withdraw"), RouteClass::Mutation);
        assert_eq!(RouteClass::from_path("/balance"), RouteClass::Standard);
        assert_eq!(RouteClass::from_path("/health"), RouteClass::Standard);
    }

    #[test]
    fn counts_down_then_rejects() {
        let limiter = tight();
        let t0 = Instant::now();

        let first = limiter.check_at(RouteClass::Login, "1.2.3.4", t0).unwrap();
        assert_eq!(first.remaining, 1);
        let second = limiter.check_at(RouteClass::Login, "1.2.3.4", t0).unwrap();
        assert_eq!(second.remaining, 0);

        let err = limiter
            .check_at(RouteClass::Login, "1.2.3.4", t0 + Duration::from_secs(10))
            .unwrap_err();
        assert_eq!(
            err,
            RateLimitError::Exceeded {
                limit: 2,
                retry_after_secs: 50
            }
        );
    }

    #[test]
    fn window_slides() {
        let limiter = tight();
        let t0 = Instant::now();
        limiter.check_at(RouteClass::Login, "c", t0).unwrap();
        limiter.check_at(RouteClass::Login, "c", t0).unwrap();
        assert!(limiter.check_at(RouteClass::Login, "c", t0).is_err());

        let later = t0 + Duration::from_secs(60);
        assert!(limiter.check_at(RouteClass::Login, "c", later).is_ok());
    }

    #[test]
    fn clients_and_classes_are_independent() {
        let limiter = tight();
        let t0 = Instant::now();
        limiter.check_at(RouteClass::Login, "a", t0).unwrap();
        limiter.check_at(RouteClass::Login, "a", t0).unwrap();

        assert!(limiter.check_at(RouteClass::Login, "b", t0).is_ok());
        assert!(limiter.check_at(RouteClass::Mutation, "a", t0).is_ok());
    }

    #[test]
    fn rejected_requests_do_not_consume_budget() {
        let limiter = tight();
        let t0 = Instant::now();
        limiter.check_at(RouteClass::Login, "c", t0).unwrap();
        limiter.check_at(RouteClass::Login, "c", t0 + Duration::from_secs(30)).unwrap();
        for _ in 0..5 {
            assert!(limiter.check_at(RouteClass::Login, "c", t0 + Duration::from_secs(40)).is_err());
        }
        // Only the first hit has aged out.
        assert!(limiter.check_at(RouteClass::Login, "c", t0 + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn disabled_limiter_admits_everything() {
        let limiter = RateLimiter::new(RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        });
        for _ in 0..100 {
            assert!(limiter.check(RouteClass::CreateAccount, "c").is_ok());
        }
    }
}
