//! Redis-backed sliding-window limiter
//!
//! One sorted set per (key, window) holds hit instants as scores. A single
//! Lua script prunes, counts and records across all windows, so concurrent
//! requests from any number of server instances are serialized by Redis.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::Script;
use tracing::{debug, instrument};

use auth_core::{DomainError, RateLimitDecision, RateLimitWindow, RateLimiter};

use crate::pool::{RedisPool, RedisPoolError};

/// Key prefix for rate-limit sorted sets
pub const RATE_LIMIT_PREFIX: &str = "ratelimit:";

/// KEYS[i]    sorted set for window i
/// ARGV[1]    now (ms)
/// ARGV[2]    unique member for this hit, empty to record nothing
/// ARGV[2i+1] window i size (ms)
/// ARGV[2i+2] window i threshold
///
/// Returns {rejected, wait_ms} where wait_ms is the longest wait among the
/// exceeded windows.
const SLIDING_WINDOW_SCRIPT: &str = r"
local now = tonumber(ARGV[1])
local member = ARGV[2]
local rejected = 0
local wait = 0

for i, key in ipairs(KEYS) do
    local size = tonumber(ARGV[2 * i + 1])
    local limit = tonumber(ARGV[2 * i + 2])
    redis.call('ZREMRANGEBYSCORE', key, '-inf', now - size)
    if redis.call('ZCARD', key) >= limit then
        rejected = 1
        local oldest = now
        local first = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
        if first[2] then
            oldest = tonumber(first[2])
        end
        local w = oldest + size - now
        if w > wait then
            wait = w
        end
    end
end

if rejected == 0 and member ~= '' then
    for i, key in ipairs(KEYS) do
        local size = tonumber(ARGV[2 * i + 1])
        redis.call('ZADD', key, now, member)
        redis.call('PEXPIRE', key, size)
    end
end

return {rejected, wait}
";

/// Sliding-window limiter whose counters live in Redis
#[derive(Clone)]
pub struct RedisRateLimiter {
    pool: RedisPool,
    windows: Vec<RateLimitWindow>,
    script: Script,
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("windows", &self.windows)
            .finish_non_exhaustive()
    }
}

impl RedisRateLimiter {
    pub fn new(pool: RedisPool, windows: Vec<RateLimitWindow>) -> Self {
        Self {
            pool,
            windows,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
        }
    }

    /// Sorted-set key for `key` under `window`
    pub fn window_key(key: &str, window: &RateLimitWindow) -> String {
        format!("{RATE_LIMIT_PREFIX}{key}:{}", window.size.as_secs())
    }

    /// Run the script for `key` at `now`, recording the hit when `record`
    /// is set and the call is admitted
    #[instrument(skip(self), fields(backend = "redis"))]
    pub async fn evaluate(
        &self,
        key: &str,
        now: DateTime<Utc>,
        record: bool,
    ) -> Result<RateLimitDecision, RedisPoolError> {
        let now_ms = now.timestamp_millis();
        let member = if record {
            format!("{now_ms}-{}", uuid::Uuid::new_v4())
        } else {
            String::new()
        };

        let mut invocation = self.script.prepare_invoke();
        invocation.arg(now_ms).arg(&member);
        for window in &self.windows {
            invocation
                .key(Self::window_key(key, window))
                .arg(window.size_millis())
                .arg(window.max_requests);
        }

        let mut conn = self.pool.get().await?;
        let (rejected, wait_ms): (i64, i64) = invocation.invoke_async(&mut conn).await?;

        if rejected == 0 {
            return Ok(RateLimitDecision::Admit);
        }

        let retry_after_secs = u64::try_from((wait_ms.max(0) + 999) / 1000)
            .unwrap_or(0)
            .max(1);
        debug!(key = %key, retry_after_secs, "Rate limit exceeded");
        Ok(RateLimitDecision::Reject { retry_after_secs })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError> {
        self.evaluate(key, now, true).await.map_err(DomainError::from)
    }

    async fn peek(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError> {
        self.evaluate(key, now, false).await.map_err(DomainError::from)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
