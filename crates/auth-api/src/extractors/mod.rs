//! Axum extractors for request handling
//!
//! Custom extractors for authentication, client metadata, validation, and
//! pagination.

mod auth;
mod client;
mod pagination;
mod path;
mod validated;

pub use auth::{AdminUser, AuthUser};
pub use client::{client_ip, ClientInfo};
pub use pagination::{Pagination, PaginationParams};
pub use path::{SessionIdPath, UserIdPath};
pub use validated::ValidatedJson;
