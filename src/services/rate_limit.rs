//! Per-client request limits for the public write endpoints.
//!
//! State lives in process memory and is lost on restart.

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{QuotaConfig, RateLimitConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Contact,
    Login,
}

impl Bucket {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Login => "login",
        }
    }
}

fn quota(config: &QuotaConfig) -> Quota {
    let max = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs(config.window_seconds.max(1)) / max.get();
    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(max))
        .allow_burst(max)
}

#[derive(Clone)]
pub struct RateLimitService {
    contact: Arc<DefaultKeyedRateLimiter<String>>,
    login: Arc<DefaultKeyedRateLimiter<String>>,
    trust_forwarded_for: bool,
}

impl RateLimitService {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            contact: Arc::new(RateLimiter::keyed(quota(&config.contact))),
            login: Arc::new(RateLimiter::keyed(quota(&config.login))),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    #[must_use]
    pub const fn trust_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    /// Records a hit for `client`. Returns `false` when over the limit.
    pub fn check(&self, bucket: Bucket, client: &str) -> bool {
        let limiter = match bucket {
            Bucket::Contact => &self.contact,
            Bucket::Login => &self.login,
        };
        limiter.check_key(&client.to_string()).is_ok()
    }

    /// Drops keys whose buckets have fully refilled.
    pub fn shrink(&self) -> usize {
        for limiter in [&self.contact, &self.login] {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
        self.contact.len() + self.login.len()
    }
}

/// Client identity: first `X-Forwarded-For` hop when trusted, else the peer address.
#[must_use]
pub fn client_key(forwarded_for: Option<&str>, peer: Option<&str>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for
        && let Some(first) = forwarded_for
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }
    peer.unwrap_or("unknown").to_string()
}
