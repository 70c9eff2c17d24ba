//! Business logic services
//!
//! Each service borrows a [`ServiceContext`] for the duration of one request
//! and orchestrates domain operations over the repository ports.

pub mod admin;
pub mod auth;
pub mod context;
pub mod error;
pub mod session;
pub mod user;

pub use admin::AdminService;
pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use session::{AccessIdentity, SessionService};
pub use user::UserService;
