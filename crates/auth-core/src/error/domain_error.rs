//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::UserId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Session not found: {0}")]
    SessionNotFound(i64),

    #[error("Invalid refresh token")]
    RefreshTokenNotFound,

    // =========================================================================
    // Token Lifecycle Errors
    // =========================================================================
    #[error("Refresh token has been revoked")]
    RefreshTokenRevoked,

    #[error("Refresh token has expired")]
    RefreshTokenExpired,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Account is inactive")]
    UserInactive,

    #[error("Token does not belong to the requesting user")]
    NotTokenOwner,

    #[error("Admin privileges required")]
    NotAdmin,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Email already exists")]
    EmailAlreadyExists,

    // =========================================================================
    // Throttling
    // =========================================================================
    #[error("Rate limit exceeded. Try again in {retry_after_secs} seconds.")]
    RateLimitExceeded { retry_after_secs: u64 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::SessionNotFound(_) => "UNKNOWN_SESSION",
            Self::RefreshTokenNotFound => "INVALID_REFRESH_TOKEN",

            // Token lifecycle
            Self::RefreshTokenRevoked => "REFRESH_TOKEN_REVOKED",
            Self::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidUsername(_) => "INVALID_USERNAME",
            Self::WeakPassword(_) => "WEAK_PASSWORD",

            // Authorization
            Self::UserInactive => "USER_INACTIVE",
            Self::NotTokenOwner => "NOT_TOKEN_OWNER",
            Self::NotAdmin => "ADMIN_REQUIRED",

            // Conflict
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Throttling
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error for an addressable resource
    ///
    /// An unknown refresh token value is an authentication failure, not a
    /// missing resource, so it is excluded here.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::SessionNotFound(_))
    }

    /// Check if this error means the presented credential is unusable
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::RefreshTokenNotFound | Self::RefreshTokenRevoked | Self::RefreshTokenExpired
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidUsername(_) | Self::WeakPassword(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::UserInactive | Self::NotTokenOwner | Self::NotAdmin)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UsernameAlreadyExists | Self::EmailAlreadyExists)
    }

    /// Check if this is a throttling error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }

    /// Seconds the caller should wait, for throttling errors
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        if self.is_validation() {
            400
        } else if self.is_authentication() {
            401
        } else if self.is_authorization() {
            403
        } else if self.is_not_found() {
            404
        } else if self.is_conflict() {
            409
        } else if self.is_rate_limited() {
            429
        } else {
            500
        }
    }
}
