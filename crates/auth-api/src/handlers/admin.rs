//! Admin handlers
//!
//! User management, gated on the admin flag by [`AdminUser`].

use axum::{extract::State, Json};
use auth_service::dto::{PaginatedResponse, UserResponse};
use auth_service::AdminService;

use crate::extractors::{AdminUser, Pagination, UserIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /admin/users?page=&page_size=
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    pagination: Pagination,
) -> ApiResult<Json<PaginatedResponse<UserResponse>>> {
    let service = AdminService::new(state.service_context());
    let page = service
        .list_users(&admin.user, pagination.page, pagination.page_size)
        .await?;
    Ok(Json(page))
}

/// GET /admin/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<Json<UserResponse>> {
    let service = AdminService::new(state.service_context());
    let user = service.get_user(&admin.user, user_id).await?;
    Ok(Json(user))
}

/// POST /admin/users/:user_id/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<Json<UserResponse>> {
    let service = AdminService::new(state.service_context());
    let user = service.deactivate_user(&admin.user, user_id).await?;
    Ok(Json(user))
}

/// POST /admin/users/:user_id/activate
pub async fn activate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<Json<UserResponse>> {
    let service = AdminService::new(state.service_context());
    let user = service.activate_user(&admin.user, user_id).await?;
    Ok(Json(user))
}
