//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context, configuration, and backend handles.

use std::sync::Arc;

use auth_cache::RedisPool;
use auth_common::{AppConfig, JwtService};
use auth_db::PgPool;
use auth_service::ServiceContext;

use crate::middleware::RateLimits;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Application configuration
    config: Arc<AppConfig>,
    /// Per-client and per-route limiters
    rate_limits: Arc<RateLimits>,
    /// `None` when running on in-memory repositories
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
}

impl AppState {
    /// Create a new `AppState`
    pub fn new(service_context: ServiceContext, config: AppConfig, rate_limits: RateLimits) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            rate_limits: Arc::new(rate_limits),
            pool: None,
            redis_pool: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_redis(mut self, pool: RedisPool) -> Self {
        self.redis_pool = Some(pool);
        self
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the JWT service from the service context
    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }

    pub fn rate_limits(&self) -> &Arc<RateLimits> {
        &self.rate_limits
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn redis_pool(&self) -> Option<&RedisPool> {
        self.redis_pool.as_ref()
    }

    /// Whether client addresses may be taken from `X-Forwarded-For`
    pub fn trust_proxy_headers(&self) -> bool {
        self.config.api.trust_proxy_headers
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("rate_limits", &self.rate_limits)
            .field("database", &self.pool.is_some())
            .field("redis", &self.redis_pool.is_some())
            .finish()
    }
}
