//! Rate limiting middleware
//!
//! A global per-address limit on every request plus stricter per-route
//! limits on the authentication endpoints. Limiter failures admit the
//! request.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use auth_cache::{RedisPool, RedisRateLimiter, SlidingWindowLimiter};
use auth_common::{AppError, RateLimitBackend, RateLimitConfig};
use auth_core::{RateLimitDecision, RateLimitWindow, RateLimiter, SharedClock};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::extractors::client_ip;
use crate::response::ApiError;

/// Key used when the caller's address cannot be determined
const UNKNOWN_CLIENT: &str = "unknown";

/// Routes that should be excluded from rate limiting
const RATE_LIMIT_EXCLUDED_PATHS: &[&str] = &["/health", "/health/ready", "/metrics"];

/// Auth routes with their own limits, keyed `<route>:<address>`
const AUTH_RATE_LIMIT_PATHS: &[(&str, &str, &[RateLimitWindow])] = &[
    (
        "/api/v1/auth/register",
        "register",
        &[
            RateLimitWindow::per_minute(5),
            RateLimitWindow::per_hour(20),
            RateLimitWindow::per_day(50),
        ],
    ),
    (
        "/api/v1/auth/login",
        "login",
        &[
            RateLimitWindow::per_minute(10),
            RateLimitWindow::per_hour(50),
            RateLimitWindow::per_day(200),
        ],
    ),
    (
        "/api/v1/auth/refresh",
        "refresh",
        &[
            RateLimitWindow::per_minute(5),
            RateLimitWindow::per_hour(20),
            RateLimitWindow::per_day(100),
        ],
    ),
    (
        "/api/v1/auth/logout",
        "logout",
        &[RateLimitWindow::per_minute(20), RateLimitWindow::per_hour(100)],
    ),
];

/// Check if a path should be excluded from rate limiting
fn should_skip_rate_limit(path: &str) -> bool {
    RATE_LIMIT_EXCLUDED_PATHS.contains(&path)
}

struct RouteLimiter {
    path: &'static str,
    name: &'static str,
    limiter: Arc<dyn RateLimiter>,
}

/// Shared state for rate limiting middleware
pub struct RateLimits {
    enabled: bool,
    trust_proxy_headers: bool,
    global: Arc<dyn RateLimiter>,
    routes: Vec<RouteLimiter>,
    /// In-process limiters that need periodic purging
    in_process: Vec<Arc<SlidingWindowLimiter>>,
    clock: SharedClock,
}

impl RateLimits {
    /// Build the global and route limiters on the configured backend
    ///
    /// # Errors
    /// Returns `AppError::Config` when the Redis backend is selected without a pool
    pub fn from_config(
        config: &RateLimitConfig,
        trust_proxy_headers: bool,
        redis: Option<&RedisPool>,
        clock: SharedClock,
    ) -> Result<Self, AppError> {
        let mut in_process = Vec::new();
        let mut build = |windows: Vec<RateLimitWindow>| -> Result<Arc<dyn RateLimiter>, AppError> {
            match config.backend {
                RateLimitBackend::Memory => {
                    let limiter = Arc::new(SlidingWindowLimiter::new(windows));
                    in_process.push(Arc::clone(&limiter));
                    Ok(limiter)
                }
                RateLimitBackend::Redis => {
                    let pool = redis.ok_or_else(|| {
                        AppError::Config("Redis rate limiting requires REDIS_URL".to_string())
                    })?;
                    Ok(Arc::new(RedisRateLimiter::new(pool.clone(), windows)))
                }
            }
        };

        let global = build(vec![
            RateLimitWindow::per_minute(config.per_minute),
            RateLimitWindow::per_hour(config.per_hour),
            RateLimitWindow::per_day(config.per_day),
        ])?;

        let mut routes = Vec::new();
        if config.route_scoped {
            for &(path, name, windows) in AUTH_RATE_LIMIT_PATHS {
                routes.push(RouteLimiter {
                    path,
                    name,
                    limiter: build(windows.to_vec())?,
                });
            }
        }

        Ok(Self {
            enabled: config.enabled,
            trust_proxy_headers,
            global,
            routes,
            in_process,
            clock,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Backend name for logs and readiness output
    pub fn backend(&self) -> &'static str {
        self.global.backend()
    }

    /// Check `ip` against the global limit and, on an auth route, that
    /// route's own limit
    ///
    /// A hit is recorded only when every applicable limiter admits it. The
    /// route limiter is peeked first so a route reject leaves the global
    /// counters untouched.
    pub async fn check(&self, path: &str, ip: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let route = self
            .routes
            .iter()
            .find(|route| route.path == path)
            .map(|route| (route, format!("{}:{ip}", route.name)));

        if let Some((route, key)) = &route {
            let decision = consult(route.limiter.as_ref(), key, now, route.name, Mode::Peek).await;
            if !decision.is_admitted() {
                return decision;
            }
        }

        let decision = consult(self.global.as_ref(), ip, now, "global", Mode::Record).await;
        if !decision.is_admitted() {
            return decision;
        }

        match &route {
            Some((route, key)) => {
                consult(route.limiter.as_ref(), key, now, route.name, Mode::Record).await
            }
            None => RateLimitDecision::Admit,
        }
    }

    /// Drop idle keys from every in-process limiter
    pub fn purge_idle(&self) -> usize {
        let now = self.clock.now();
        self.in_process
            .iter()
            .map(|limiter| limiter.purge_idle(now))
            .sum()
    }
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimits")
            .field("enabled", &self.enabled)
            .field("backend", &self.backend())
            .field("route_scoped", &!self.routes.is_empty())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Peek,
    Record,
}

async fn consult(
    limiter: &dyn RateLimiter,
    key: &str,
    now: DateTime<Utc>,
    scope: &str,
    mode: Mode,
) -> RateLimitDecision {
    let result = match mode {
        Mode::Peek => limiter.peek(key, now).await,
        Mode::Record => limiter.check(key, now).await,
    };
    match result {
        Ok(decision) => decision,
        Err(e) => {
            warn!(
                error = %e,
                scope,
                backend = limiter.backend(),
                "Rate limiter unavailable, admitting request"
            );
            RateLimitDecision::Admit
        }
    }
}

/// Periodically purge idle keys from the in-process limiters
///
/// Returns `None` when every limiter lives in Redis.
pub fn spawn_purge_task(limits: &Arc<RateLimits>, every: Duration) -> Option<JoinHandle<()>> {
    if limits.in_process.is_empty() {
        return None;
    }

    let limits = Arc::clone(limits);
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let purged = limits.purge_idle();
            if purged > 0 {
                debug!(purged, "Purged idle rate-limit keys");
            }
        }
    }))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limits): State<Arc<RateLimits>>,
    request: Request,
    next: Next,
) -> Response {
    if !limits.is_enabled() || should_skip_rate_limit(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = client_ip(
        request.headers(),
        request.extensions(),
        limits.trust_proxy_headers,
    )
    .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    match limits.check(request.uri().path(), &ip).await {
        RateLimitDecision::Admit => next.run(request).await,
        RateLimitDecision::Reject { retry_after_secs } => {
            warn!(
                ip_address = %ip,
                path = %request.uri().path(),
                retry_after = retry_after_secs,
                "Rate limit exceeded"
            );
            ApiError::from(AppError::RateLimitExceeded { retry_after_secs }).into_response()
        }
    }
}
