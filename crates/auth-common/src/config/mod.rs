//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, RateLimitBackend, RateLimitConfig, RedisConfig, ServerConfig,
    SessionConfig,
};
