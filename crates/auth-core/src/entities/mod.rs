//! Domain entities - core business objects

mod refresh_token;
mod user;

pub use refresh_token::{ClientMeta, NewRefreshToken, RefreshToken, TokenStatus};
pub use user::{NewUser, User};
