//! User service
//!
//! Handles the caller's own profile: read, update, and soft delete.

use auth_core::{DomainError, User, UserId};
use tracing::{info, instrument};

use crate::dto::{normalize_username, MessageResponse, UpdateUserRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::SessionService;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new `UserService`
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get user entity by ID
    #[instrument(skip(self))]
    pub async fn get_user_entity(&self, user_id: UserId) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }

    /// Get the caller's profile
    pub async fn get_profile(&self, user_id: UserId) -> ServiceResult<UserResponse> {
        let user = self.get_user_entity(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Change username and/or email
    ///
    /// Uniqueness is checked against other users only, so resubmitting the
    /// current values is allowed.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> ServiceResult<UserResponse> {
        if request.is_empty() {
            return Err(ServiceError::validation("No fields to update"));
        }

        let username = request
            .username
            .as_deref()
            .map(normalize_username)
            .transpose()?;
        let email = request.email.as_deref().map(str::trim);

        let user = self
            .ctx
            .user_repo()
            .update_profile(user_id, username.as_deref(), email, self.ctx.now())
            .await?;

        info!(user_id = %user_id, "User profile updated");
        Ok(UserResponse::from(&user))
    }

    /// Soft-delete the caller's account
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_account(&self, user_id: UserId) -> ServiceResult<MessageResponse> {
        self.deactivate(user_id).await?;
        Ok(MessageResponse::new("User account deleted successfully"))
    }

    /// Clear the active flag and, under the configured policy, revoke every
    /// refresh token the user holds
    pub(crate) async fn deactivate(&self, user_id: UserId) -> ServiceResult<User> {
        let user = self
            .ctx
            .user_repo()
            .set_active(user_id, false, self.ctx.now())
            .await?;

        if self.ctx.session_config().revoke_on_deactivate {
            SessionService::new(self.ctx).revoke_all(user_id).await?;
        }

        info!(user_id = %user_id, "User account deactivated");
        Ok(user)
    }
}
