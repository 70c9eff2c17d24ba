//! Path parameter extractors
//!
//! Type-safe extraction of numeric ids from path parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use auth_core::UserId;
use serde::Deserialize;

use crate::response::ApiError;

/// Path parameters with `user_id`
#[derive(Debug, Deserialize)]
struct UserIdParams {
    user_id: String,
}

/// `:user_id` parsed as a [`UserId`]
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<UserIdParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        params
            .user_id
            .parse()
            .map(UserIdPath)
            .map_err(|_| ApiError::invalid_path("Invalid user_id format"))
    }
}

/// Path parameters with `session_id`
#[derive(Debug, Deserialize)]
struct SessionIdParams {
    session_id: String,
}

/// `:session_id`, the id of a refresh-token record
#[derive(Debug, Clone, Copy)]
pub struct SessionIdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SessionIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<SessionIdParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        params
            .session_id
            .parse()
            .map(SessionIdPath)
            .map_err(|_| ApiError::invalid_path("Invalid session_id format"))
    }
}
