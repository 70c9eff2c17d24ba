//! # auth-db
//!
//! Database layer implementing the `auth-core` repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx, with migrations applied at startup
//! - In-memory repositories with the same guarantees, for tests and for
//!   running without a database
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_db::{create_pool, run_migrations, PgUserRepository};
//!
//! async fn example(config: &auth_common::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     let user_repo = PgUserRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{InMemoryRefreshTokenRepository, InMemoryUserRepository};
pub use pool::{create_pool, run_migrations, run_migrations_from, PgPool, MIGRATIONS_DIR};
pub use repositories::{PgRefreshTokenRepository, PgUserRepository};
