//! # auth-core
//!
//! Domain layer containing entities, value objects, and the ports (repository,
//! clock, and rate-limiter traits) the rest of the workspace plugs into.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod clock;
pub mod entities;
pub mod error;
pub mod ratelimit;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use entities::{ClientMeta, NewRefreshToken, NewUser, RefreshToken, TokenStatus, User};
pub use error::DomainError;
pub use ratelimit::{RateLimitDecision, RateLimitWindow, RateLimiter};
pub use traits::{RefreshTokenRepository, RepoResult, UserRepository};
pub use value_objects::{UserId, UserIdParseError};
