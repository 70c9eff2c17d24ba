//! Rate-limit port - sliding windows and the admit/reject decision

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;

/// One sliding window: at most `max_requests` hits within any `size` span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub size: Duration,
    pub max_requests: u32,
}

impl RateLimitWindow {
    pub const fn new(size: Duration, max_requests: u32) -> Self {
        Self { size, max_requests }
    }

    pub const fn per_minute(max_requests: u32) -> Self {
        Self::new(Duration::from_secs(60), max_requests)
    }

    pub const fn per_hour(max_requests: u32) -> Self {
        Self::new(Duration::from_secs(3_600), max_requests)
    }

    pub const fn per_day(max_requests: u32) -> Self {
        Self::new(Duration::from_secs(86_400), max_requests)
    }

    /// Window length in milliseconds
    #[inline]
    pub fn size_millis(&self) -> i64 {
        i64::try_from(self.size.as_millis()).unwrap_or(i64::MAX)
    }

    /// Seconds until a hit recorded at `oldest_ms` leaves this window,
    /// rounded up and never below one
    pub fn retry_after_secs(&self, oldest_ms: i64, now_ms: i64) -> u64 {
        let remaining = oldest_ms
            .saturating_add(self.size_millis())
            .saturating_sub(now_ms)
            .max(0);
        let secs = (remaining + 999) / 1000;
        u64::try_from(secs).unwrap_or(0).max(1)
    }
}

/// Outcome of a limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Admit,
    Reject { retry_after_secs: u64 },
}

impl RateLimitDecision {
    #[inline]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit)
    }

    /// Fold into a `Result`, turning a reject into `RateLimitExceeded`
    pub fn into_result(self) -> Result<(), DomainError> {
        match self {
            Self::Admit => Ok(()),
            Self::Reject { retry_after_secs } => {
                Err(DomainError::RateLimitExceeded { retry_after_secs })
            }
        }
    }
}

/// Multi-window sliding limiter keyed by caller identity
///
/// A call either records a hit in every window and admits, or records
/// nothing and rejects. Errors are reserved for backend failures.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError>;

    /// Decide as `check` would at `now` without recording a hit
    async fn peek(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError>;

    /// Backend name for logs and readiness output
    fn backend(&self) -> &'static str;
}
