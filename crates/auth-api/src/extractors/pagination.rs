//! Pagination extractor
//!
//! Extracts page-number pagination parameters from query strings. Range
//! checks happen in the admin service so every caller gets the same errors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use auth_service::services::admin::DEFAULT_PAGE_SIZE;
use serde::Deserialize;

use crate::response::ApiError;

/// Raw pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

/// Pagination parameters with defaults applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        let defaults = Self::default();
        Self {
            page: params.page.unwrap_or(defaults.page),
            page_size: params.page_size.unwrap_or(defaults.page_size),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(Pagination::from(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pagination() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, 20);
    }

    #[test]
    fn test_pagination_from_params() {
        let pagination = Pagination::from(PaginationParams {
            page: Some(3),
            page_size: None,
        });
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_non_numeric_page_is_rejected() {
        let (mut parts, ()) = axum::http::Request::get("/?page=two")
            .body(())
            .unwrap()
            .into_parts();
        let err = Pagination::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY_PARAMETER");
    }
}
