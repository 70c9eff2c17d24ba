//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use auth_core::{RefreshToken, User};

use super::responses::{SessionResponse, UserResponse};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.into_inner(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl SessionResponse {
    /// Describe `token`, flagging it when it is the caller's own session
    pub fn from_token(token: &RefreshToken, current_session_id: Option<i64>) -> Self {
        Self {
            id: token.id,
            user_agent: token.client.user_agent.clone(),
            ip_address: token.client.ip_address.clone(),
            created_at: token.created_at,
            expires_at: token.expires_at,
            is_current: current_session_id == Some(token.id),
        }
    }
}
