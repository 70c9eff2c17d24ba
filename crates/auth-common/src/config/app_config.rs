//! Application configuration structs
//!
//! Loads configuration from environment variables (and an optional `.env`).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

const MIN_JWT_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    /// `None` runs on in-memory repositories
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(other.to_string()),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// Take the client address from `X-Forwarded-For`
    pub trust_proxy_headers: bool,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Refresh-token session policy
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub rotate_refresh_tokens: bool,
    /// Live refresh tokens a user may hold at once
    pub max_sessions_per_user: usize,
    /// Revoke all refresh tokens when an account is deactivated
    pub revoke_on_deactivate: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rotate_refresh_tokens: true,
            max_sessions_per_user: 5,
            revoke_on_deactivate: true,
        }
    }
}

/// Where rate-limit counters live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for RateLimitBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(other.to_string()),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub per_minute: u32,
    pub per_hour: u32,
    pub per_day: u32,
    pub backend: RateLimitBackend,
    /// Give auth routes their own counters keyed `<route>:<address>`
    pub route_scoped: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_minute: 60,
            per_hour: 1000,
            per_day: 10000,
            backend: RateLimitBackend::Memory,
            route_scoped: true,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Console,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "console" | "text" | "pretty" => Ok(Self::Console),
            other => Err(other.to_string()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env_kind: Environment = parse_or(&get, "ENVIRONMENT", Environment::Development)?;

        let secret = get("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET",
                format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
            ));
        }

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 20)?,
                min_connections: parse_or(&get, "DATABASE_MIN_CONNECTIONS", 5)?,
                run_migrations: parse_or(&get, "DATABASE_RUN_MIGRATIONS", true)?,
            }),
            None => None,
        };

        let redis = match get("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: parse_or(&get, "REDIS_MAX_CONNECTIONS", 16)?,
            }),
            None => None,
        };

        let rate_limit = RateLimitConfig {
            enabled: parse_or(&get, "RATE_LIMIT_ENABLED", true)?,
            per_minute: parse_or(&get, "RATE_LIMIT_PER_MINUTE", 60)?,
            per_hour: parse_or(&get, "RATE_LIMIT_PER_HOUR", 1000)?,
            per_day: parse_or(&get, "RATE_LIMIT_PER_DAY", 10000)?,
            backend: parse_or(&get, "RATE_LIMIT_BACKEND", RateLimitBackend::Memory)?,
            route_scoped: parse_or(&get, "RATE_LIMIT_ROUTE_SCOPED", true)?,
        };
        if rate_limit.backend == RateLimitBackend::Redis && redis.is_none() {
            return Err(ConfigError::MissingVar("REDIS_URL"));
        }

        let default_format = if env_kind.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Console
        };

        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(|| "auth-server".to_string()),
                env: env_kind,
            },
            api: ServerConfig {
                host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&get, "API_PORT", 8000)?,
                request_timeout_secs: parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?,
                trust_proxy_headers: parse_or(&get, "TRUST_PROXY_HEADERS", false)?,
            },
            database,
            redis,
            jwt: JwtConfig {
                secret,
                access_token_expiry: parse_or::<i64, _>(&get, "ACCESS_TOKEN_EXPIRE_MINUTES", 30)?
                    * 60,
                refresh_token_expiry: parse_or::<i64, _>(&get, "REFRESH_TOKEN_EXPIRE_DAYS", 7)?
                    * 86_400,
            },
            session: SessionConfig {
                rotate_refresh_tokens: parse_or(&get, "ROTATE_REFRESH_TOKENS", true)?,
                max_sessions_per_user: parse_or(&get, "MAX_SESSIONS_PER_USER", 5)?,
                revoke_on_deactivate: parse_or(&get, "REVOKE_SESSIONS_ON_DEACTIVATE", true)?,
            },
            rate_limit,
            cors: CorsConfig {
                allowed_origins: get("CORS_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            logging: LoggingConfig {
                level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                format: parse_or(&get, "LOG_FORMAT", default_format)?,
            },
        })
    }
}

fn parse_or<T, F>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
