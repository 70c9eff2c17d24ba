//! # auth-cache
//!
//! Rate-limit counter stores.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **In-process limiter**: per-key sliding windows in a `DashMap`
//! - **Redis limiter**: sorted-set sliding windows updated by one Lua script,
//!   shared across server instances
//!
//! ## Example
//!
//! ```ignore
//! use auth_cache::SlidingWindowLimiter;
//! use auth_core::{RateLimitWindow, RateLimitDecision};
//!
//! let limiter = SlidingWindowLimiter::new(vec![
//!     RateLimitWindow::per_minute(60),
//!     RateLimitWindow::per_hour(1000),
//! ]);
//!
//! match limiter.evaluate("203.0.113.7", chrono::Utc::now()) {
//!     RateLimitDecision::Admit => { /* serve */ }
//!     RateLimitDecision::Reject { retry_after_secs } => { /* 429 */ }
//! }
//! ```

pub mod pool;
pub mod ratelimit;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export limiter types
pub use ratelimit::{RedisRateLimiter, SlidingWindowLimiter, RATE_LIMIT_PREFIX};
