//! Refresh token entity - a long-lived, revocable session credential

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// Optional metadata about the client a token was issued to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    /// Build metadata from the two optional request attributes
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Lifecycle state of a refresh token at a given instant
///
/// `Revoked` is stored; `Expired` is derived from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Live,
    Revoked,
    Expired,
}

/// Persisted refresh token record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: i64,
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub client: ClientMeta,
}

impl RefreshToken {
    /// Check if the token has passed its expiry instant
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Resolve the token's state; revocation wins over expiry
    pub fn status(&self, now: DateTime<Utc>) -> TokenStatus {
        if self.revoked {
            TokenStatus::Revoked
        } else if self.is_expired_at(now) {
            TokenStatus::Expired
        } else {
            TokenStatus::Live
        }
    }

    /// Shorthand for `status(now) == Live`
    #[inline]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == TokenStatus::Live
    }

    /// Check ownership
    #[inline]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Fields needed to persist a new refresh token
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub client: ClientMeta,
}
