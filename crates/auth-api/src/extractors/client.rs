//! Client metadata extractor
//!
//! Resolves the caller's address and user agent for session records and
//! rate-limit keys.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{header, request::Parts, Extensions, HeaderMap},
};
use auth_core::ClientMeta;

use crate::state::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Address and user agent of the calling client
#[derive(Debug, Clone, Default)]
pub struct ClientInfo(pub ClientMeta);

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let ip_address = client_ip(
            &parts.headers,
            &parts.extensions,
            app_state.trust_proxy_headers(),
        );
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(ClientInfo(ClientMeta::new(ip_address, user_agent)))
    }
}

/// Caller address: the first `X-Forwarded-For` entry when proxy headers are
/// trusted, otherwise the TCP peer
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        if let Some(forwarded) = forwarded_for(headers) {
            return Some(forwarded);
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
