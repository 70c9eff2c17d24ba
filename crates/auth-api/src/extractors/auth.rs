//! Authentication extractors
//!
//! Validate the bearer access token and load the calling user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use auth_common::AppError;
use auth_core::{DomainError, User, UserId};
use auth_service::{AdminService, SessionService};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated, active user extracted from the access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Refresh-token record the access token was issued with
    pub session_id: i64,
}

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let identity = SessionService::new(app_state.service_context())
            .verify_access(bearer.token())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Access token rejected");
                // A token for a vanished account is just an invalid token
                if matches!(e.as_domain(), Some(DomainError::UserNotFound(_))) {
                    ApiError::App(AppError::InvalidToken)
                } else {
                    ApiError::from(e)
                }
            })?;

        Ok(AuthUser {
            user: identity.user,
            session_id: identity.session_id,
        })
    }
}

/// Authenticated user holding the admin flag
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        AdminService::ensure_admin(&auth.user).map_err(|e| {
            tracing::warn!(user_id = %auth.user.id, "Admin route refused");
            ApiError::from(e)
        })?;

        Ok(AdminUser(auth))
    }
}
