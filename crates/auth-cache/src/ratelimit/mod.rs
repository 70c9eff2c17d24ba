//! Sliding-window rate limiters

mod redis_limiter;
mod sliding_window;

pub use redis_limiter::{RedisRateLimiter, RATE_LIMIT_PREFIX};
pub use sliding_window::SlidingWindowLimiter;
