//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{NewRefreshToken, NewUser, RefreshToken, User};
use crate::error::DomainError;
use crate::value_objects::UserId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by exact username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Create a new user
    ///
    /// Fails with `UsernameAlreadyExists` / `EmailAlreadyExists` when either
    /// unique field is taken.
    async fn create(
        &self,
        user: &NewUser,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<User>;

    /// Update username and/or email; `None` leaves a field untouched
    async fn update_profile(
        &self,
        id: UserId,
        username: Option<&str>,
        email: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<User>;

    /// Flip the active flag
    async fn set_active(&self, id: UserId, active: bool, now: DateTime<Utc>) -> RepoResult<User>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// List users ordered by ID
    async fn list(&self, offset: i64, limit: i64) -> RepoResult<Vec<User>>;

    /// Total number of users
    async fn count(&self) -> RepoResult<i64>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new token record
    async fn create(&self, token: &NewRefreshToken) -> RepoResult<RefreshToken>;

    /// Find token by its opaque value
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<RefreshToken>>;

    /// Find token by record ID
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<RefreshToken>>;

    /// Revoke iff not yet revoked
    ///
    /// Returns `true` only for the call that performed the transition.
    /// Concurrent callers racing on the same value see exactly one `true`.
    async fn revoke(&self, token: &str) -> RepoResult<bool>;

    /// Revoke `old_token` iff still live and persist `replacement`, as one step
    ///
    /// Returns `None`, writing nothing, when `old_token` was already revoked.
    /// On error `old_token` is left as it was.
    async fn rotate(
        &self,
        old_token: &str,
        replacement: &NewRefreshToken,
    ) -> RepoResult<Option<RefreshToken>>;

    /// Revoke every unrevoked token of a user, returning how many flipped
    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64>;

    /// Unrevoked, unexpired tokens of a user, oldest first
    async fn list_live_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<RefreshToken>>;
}
