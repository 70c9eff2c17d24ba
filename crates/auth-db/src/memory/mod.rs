//! In-memory repositories
//!
//! Same contracts as the PostgreSQL repositories, held in process memory.
//! Used by tests and when no `DATABASE_URL` is configured.

mod refresh_token;
mod user;

pub use refresh_token::InMemoryRefreshTokenRepository;
pub use user::InMemoryUserRepository;
