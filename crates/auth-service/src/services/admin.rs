//! Admin service
//!
//! User management for administrators. Every operation checks the acting
//! user's admin flag.

use auth_core::{DomainError, User, UserId};
use tracing::{info, instrument};

use crate::dto::{PaginatedResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::user::UserService;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Admin service
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    /// Create a new `AdminService`
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reject non-admin actors
    ///
    /// # Errors
    /// Returns `DomainError::NotAdmin`
    pub fn ensure_admin(actor: &User) -> ServiceResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(DomainError::NotAdmin.into())
        }
    }

    /// One page of users ordered by id
    #[instrument(skip(self, actor), fields(admin_id = %actor.id))]
    pub async fn list_users(
        &self,
        actor: &User,
        page: i64,
        page_size: i64,
    ) -> ServiceResult<PaginatedResponse<UserResponse>> {
        Self::ensure_admin(actor)?;

        if page < 1 {
            return Err(ServiceError::validation("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ServiceError::validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let offset = (page - 1).saturating_mul(page_size);
        let users = self.ctx.user_repo().list(offset, page_size).await?;
        let total = self.ctx.user_repo().count().await?;

        Ok(PaginatedResponse::new(
            users.iter().map(UserResponse::from).collect(),
            total,
            page,
            page_size,
        ))
    }

    #[instrument(skip(self, actor), fields(admin_id = %actor.id))]
    pub async fn get_user(&self, actor: &User, user_id: UserId) -> ServiceResult<UserResponse> {
        Self::ensure_admin(actor)?;

        let user = UserService::new(self.ctx).get_user_entity(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Deactivate an account, with the same session cascade as self-deletion
    #[instrument(skip(self, actor), fields(admin_id = %actor.id))]
    pub async fn deactivate_user(
        &self,
        actor: &User,
        user_id: UserId,
    ) -> ServiceResult<UserResponse> {
        Self::ensure_admin(actor)?;

        let user = UserService::new(self.ctx).deactivate(user_id).await?;
        info!(admin_id = %actor.id, user_id = %user_id, "User deactivated by admin");
        Ok(UserResponse::from(&user))
    }

    #[instrument(skip(self, actor), fields(admin_id = %actor.id))]
    pub async fn activate_user(
        &self,
        actor: &User,
        user_id: UserId,
    ) -> ServiceResult<UserResponse> {
        Self::ensure_admin(actor)?;

        let user = self
            .ctx
            .user_repo()
            .set_active(user_id, true, self.ctx.now())
            .await?;
        info!(admin_id = %actor.id, user_id = %user_id, "User activated by admin");
        Ok(UserResponse::from(&user))
    }
}
