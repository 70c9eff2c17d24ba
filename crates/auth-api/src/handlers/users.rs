//! User handlers
//!
//! The caller's own profile and sessions.

use axum::{extract::State, Json};
use auth_service::dto::{MessageResponse, SessionResponse, UpdateUserRequest, UserResponse};
use auth_service::{SessionService, UserService};

use crate::extractors::{AuthUser, SessionIdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Get current user profile
///
/// GET /users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.get_profile(auth.user_id()).await?;
    Ok(Json(user))
}

/// Update current user profile
///
/// PUT /users/me
pub async fn update_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.update_profile(auth.user_id(), request).await?;
    Ok(Json(user))
}

/// Soft-delete the current account
///
/// DELETE /users/me
pub async fn delete_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.delete_account(auth.user_id()).await?;
    Ok(Json(response))
}

/// List the caller's live sessions, newest first
///
/// GET /users/me/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let service = SessionService::new(state.service_context());
    let sessions = service
        .list_sessions(auth.user_id(), Some(auth.session_id))
        .await?;
    Ok(Json(sessions))
}

/// Revoke one of the caller's sessions
///
/// DELETE /users/me/sessions/:session_id
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    SessionIdPath(session_id): SessionIdPath,
) -> ApiResult<Json<MessageResponse>> {
    let service = SessionService::new(state.service_context());
    service.revoke_session(auth.user_id(), session_id).await?;
    Ok(Json(MessageResponse::new("Session revoked")))
}
