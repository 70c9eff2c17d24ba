//! Service context - dependency container for services
//!
//! Holds the repositories, credential services, clock, and session policy
//! that every service borrows.

use std::sync::Arc;

use auth_common::{JwtService, PasswordService, SessionConfig};
use auth_core::traits::{RefreshTokenRepository, UserRepository};
use auth_core::{Clock, SharedClock, SystemClock};
use chrono::{DateTime, Duration, Utc};

use super::error::{ServiceError, ServiceResult};

const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Service context containing all dependencies
///
/// Cloning is cheap; every dependency sits behind an `Arc` or is `Copy`.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,

    // Credentials
    jwt_service: Arc<JwtService>,
    password_service: PasswordService,

    // Time and policy
    clock: SharedClock,
    session_config: SessionConfig,
    refresh_token_ttl: Duration,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        jwt_service: Arc<JwtService>,
        clock: SharedClock,
        session_config: SessionConfig,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            user_repo,
            refresh_token_repo,
            jwt_service,
            password_service: PasswordService::new(),
            clock,
            session_config,
            refresh_token_ttl,
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the refresh token repository
    pub fn refresh_token_repo(&self) -> &dyn RefreshTokenRepository {
        self.refresh_token_repo.as_ref()
    }

    // === Credentials ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the password service
    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    // === Time and policy ===

    /// Current instant according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    /// Lifetime of newly issued refresh tokens
    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("jwt_service", &"JwtService")
            .field("session_config", &self.session_config)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish_non_exhaustive()
    }
}

/// Builder for creating `ServiceContext` with custom configuration
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    refresh_token_repo: Option<Arc<dyn RefreshTokenRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    clock: Option<SharedClock>,
    session_config: SessionConfig,
    refresh_token_ttl: Duration,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            refresh_token_repo: None,
            jwt_service: None,
            clock: None,
            session_config: SessionConfig::default(),
            refresh_token_ttl: Duration::days(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn refresh_token_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_token_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    /// Defaults to the system clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    /// Build the `ServiceContext`
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        if self.refresh_token_ttl <= Duration::zero() {
            return Err(ServiceError::validation("refresh_token_ttl must be positive"));
        }

        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.refresh_token_repo
                .ok_or_else(|| ServiceError::validation("refresh_token_repo is required"))?,
            self.jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.session_config,
            self.refresh_token_ttl,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
