//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use auth_cache::RedisPool;
use auth_common::{AppConfig, AppError, JwtService};
use auth_core::{RefreshTokenRepository, SharedClock, SystemClock, UserRepository};
use auth_db::{
    create_pool, run_migrations, InMemoryRefreshTokenRepository, InMemoryUserRepository,
    PgRefreshTokenRepository, PgUserRepository,
};
use auth_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, spawn_purge_task, RateLimits};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// How often idle in-process rate-limit keys are dropped
const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router().merge(health_routes());
    let router = apply_middleware(router, &state);
    router.with_state(state)
}

/// Initialize all dependencies and create `AppState`
///
/// # Errors
/// Returns an error if a configured backend cannot be reached
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    create_app_state_with_clock(config, Arc::new(SystemClock)).await
}

/// Same as [`create_app_state`] with an explicit time source
///
/// # Errors
/// Returns an error if a configured backend cannot be reached
pub async fn create_app_state_with_clock(
    config: AppConfig,
    clock: SharedClock,
) -> Result<AppState, AppError> {
    // Repositories: PostgreSQL when configured, otherwise in-memory
    let (user_repo, refresh_token_repo, pool) = match &config.database {
        Some(db_config) => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(db_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            if db_config.run_migrations {
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                info!("Database migrations applied");
            }

            let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
            let refresh_token_repo: Arc<dyn RefreshTokenRepository> =
                Arc::new(PgRefreshTokenRepository::new(pool.clone()));
            (user_repo, refresh_token_repo, Some(pool))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories; data is lost on restart");
            let user_repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
            let refresh_token_repo: Arc<dyn RefreshTokenRepository> =
                Arc::new(InMemoryRefreshTokenRepository::new());
            (user_repo, refresh_token_repo, None)
        }
    };

    let redis_pool = match &config.redis {
        Some(redis_config) => {
            info!("Creating Redis pool...");
            let redis_pool =
                RedisPool::from_config(redis_config).map_err(|e| AppError::Cache(e.to_string()))?;
            Some(redis_pool)
        }
        None => None,
    };

    let rate_limits = RateLimits::from_config(
        &config.rate_limit,
        config.api.trust_proxy_headers,
        redis_pool.as_ref(),
        Arc::clone(&clock),
    )?;
    info!(
        enabled = rate_limits.is_enabled(),
        backend = rate_limits.backend(),
        "Rate limiter configured"
    );

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        chrono::Duration::seconds(config.jwt.access_token_expiry),
    ));

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .refresh_token_repo(refresh_token_repo)
        .jwt_service(jwt_service)
        .clock(clock)
        .session_config(config.session)
        .refresh_token_ttl(chrono::Duration::seconds(config.jwt.refresh_token_expiry))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let mut state = AppState::new(service_context, config, rate_limits);
    if let Some(pool) = pool {
        state = state.with_database(pool);
    }
    if let Some(redis_pool) = redis_pool {
        state = state.with_redis(redis_pool);
    }

    Ok(state)
}

/// Serve `app` on an already bound listener until shutdown
///
/// # Errors
/// Returns an error if the server fails
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the HTTP server
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    serve(listener, app).await
}

/// Run the complete server with configuration
///
/// # Errors
/// Returns an error if startup or serving fails
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.api.address();
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address {address}: {e}")))?;

    // Create app state
    let state = create_app_state(config).await?;
    let _purge = spawn_purge_task(state.rate_limits(), RATE_LIMIT_PURGE_INTERVAL);

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, addr).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let config = AppConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("an-adequately-long-secret-for-tests-0001".to_string()),
            _ => None,
        })
        .unwrap();
        create_app(create_app_state(config).await.unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_readiness_on_in_memory_backends() {
        let response = test_app()
            .await
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["checks"]["database"], "healthy");
        assert_eq!(json["checks"]["rate_limiter"], "healthy");
    }

    #[tokio::test]
    async fn test_protected_route_requires_bearer() {
        let response = test_app()
            .await
            .oneshot(Request::get("/api/v1/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "MISSING_AUTHORIZATION");
    }

    #[tokio::test]
    async fn test_register_then_me() {
        let app = test_app().await;

        let register = Request::post("/api/v1/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username":"alice","email":"alice@example.com","password":"SecurePass123"}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(register).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let tokens: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(tokens["token_type"], "bearer");
        let access = tokens["access_token"].as_str().unwrap();

        let me = Request::get("/api/v1/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(me).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let user: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(user["username"], "alice");
        assert_eq!(user["is_admin"], false);
    }
}
