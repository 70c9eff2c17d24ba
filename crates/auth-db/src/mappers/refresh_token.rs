//! Refresh token model -> entity mapper

use auth_core::entities::{ClientMeta, RefreshToken};
use auth_core::value_objects::UserId;

use crate::models::RefreshTokenModel;

impl From<RefreshTokenModel> for RefreshToken {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshToken {
            id: model.id,
            token: model.token,
            user_id: UserId::new(model.user_id),
            expires_at: model.expires_at,
            revoked: model.revoked,
            created_at: model.created_at,
            client: ClientMeta::new(model.ip_address, model.user_agent),
        }
    }
}
