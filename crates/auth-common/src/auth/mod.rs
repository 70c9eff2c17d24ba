//! Credential utilities

mod jwt;
mod password;
mod refresh;

pub use jwt::{AccessClaims, JwtService, ACCESS_TOKEN_TYPE};
pub use password::{
    hash_password, validate_password_strength, verify_password, PasswordService,
};
pub use refresh::{generate_refresh_token, REFRESH_TOKEN_BYTES};
