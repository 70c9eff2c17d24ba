//! API Integration Tests
//!
//! Each test spawns its own server on an ephemeral port backed by the
//! in-memory repositories and the in-process rate limiter, so no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, assert_status, fixtures::*, TestServer};
use reqwest::{header, StatusCode};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["rate_limiter"], "healthy");
}

#[tokio::test]
async fn test_security_headers() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert!(headers.contains_key("permissions-policy"));
    assert!(headers.contains_key("x-request-id"));
    assert!(!headers.contains_key("server"));
    // Development mode
    assert!(!headers.contains_key("content-security-policy"));
    assert!(!headers.contains_key("strict-transport-security"));
}

#[tokio::test]
async fn test_security_headers_in_production() {
    let server = TestServer::start_with(&[
        ("ENVIRONMENT", "production"),
        ("RATE_LIMIT_ENABLED", "false"),
    ])
    .await
    .expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    let headers = response.headers();
    assert!(headers.contains_key("content-security-policy"));
    assert_eq!(
        headers["strict-transport-security"],
        "max-age=31536000; includeSubDomains; preload"
    );
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    let tokens: TokenResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(tokens.token_type, "bearer");
    assert_eq!(tokens.expires_in, 1800);
    assert!(!tokens.access_token.is_empty());
    assert_eq!(tokens.refresh_token.len(), 43);

    let response = server
        .get_auth("/api/v1/auth/me", &tokens.access_token)
        .await
        .unwrap();
    let user: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(user.username, request.username);
    assert_eq!(user.email, request.email);
    assert!(user.is_active);
    assert!(!user.is_admin);
    assert!(!user.email_verified);
}

#[tokio::test]
async fn test_register_duplicates() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (request, _) = server.register_user().await.unwrap();

    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(body.error.message, "Username already exists");

    let same_email = RegisterRequest {
        email: request.email.clone(),
        ..RegisterRequest::unique()
    };
    let response = server
        .post("/api/v1/auth/register", &same_email)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(body.error.message, "Email already exists");
}

#[tokio::test]
async fn test_register_validation() {
    let server = TestServer::start().await.expect("Failed to start server");

    let bad_shape = RegisterRequest {
        username: "ab".to_string(),
        email: "not-an-email".to_string(),
        password: "short".to_string(),
    };
    let response = server
        .post("/api/v1/auth/register", &bad_shape)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
    assert!(body.error.details.is_some());

    let weak = RegisterRequest {
        password: "alllowercase1".to_string(),
        ..RegisterRequest::unique()
    };
    let response = server.post("/api/v1/auth/register", &weak).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let bad_chars = RegisterRequest {
        username: "bad name!".to_string(),
        ..RegisterRequest::unique()
    };
    let response = server.post("/api/v1/auth/register", &bad_chars).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_login() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (register_req, _) = server.register_user().await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let tokens: TokenResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert!(!tokens.access_token.is_empty());
    assert_eq!(tokens.token_type, "bearer");
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (register_req, _) = server.register_user().await.unwrap();

    let wrong_password = LoginRequest {
        username: register_req.username.clone(),
        password: "WrongPass999".to_string(),
    };
    let unknown_user = LoginRequest {
        username: "nobody_here".to_string(),
        password: TEST_PASSWORD.to_string(),
    };

    let first: ErrorBody = assert_json(
        server.post("/api/v1/auth/login", &wrong_password).await.unwrap(),
        StatusCode::UNAUTHORIZED,
    )
    .await
    .unwrap();
    let second: ErrorBody = assert_json(
        server.post("/api/v1/auth/login", &unknown_user).await.unwrap(),
        StatusCode::UNAUTHORIZED,
    )
    .await
    .unwrap();

    assert_eq!(first.error.code, "INVALID_CREDENTIALS");
    assert_eq!(first.error.code, second.error.code);
    assert_eq!(first.error.message, second.error.message);
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/v1/auth/me").await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "MISSING_AUTHORIZATION");

    let response = server
        .get_auth("/api/v1/auth/me", "not.a.jwt")
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, tokens) = server.register_user().await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&tokens.refresh_token),
        )
        .await
        .unwrap();
    let rotated: TokenResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(rotated.refresh_token, tokens.refresh_token);

    // The old refresh token is spent
    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&tokens.refresh_token),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "REFRESH_TOKEN_REVOKED");

    // The new pair works
    let response = server
        .get_auth("/api/v1/auth/me", &rotated.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&rotated.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/api/v1/auth/refresh", &RefreshTokenRequest::new("nope"))
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, tokens) = server.register_user().await.unwrap();
    let body = RefreshTokenRequest::new(&tokens.refresh_token);

    let attempts = (0..6).map(|_| server.post("/api/v1/auth/refresh", &body));
    let responses = futures::future::join_all(attempts).await;

    let statuses: Vec<StatusCode> = responses
        .into_iter()
        .map(|r| r.unwrap().status())
        .collect();
    let winners = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(winners, 1, "statuses: {statuses:?}");
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::OK || *s == StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_logout() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, tokens) = server.register_user().await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/auth/logout",
            &tokens.access_token,
            &RefreshTokenRequest::new(&tokens.refresh_token),
        )
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(message.message, "Successfully logged out");

    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&tokens.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout_someone_elses_token() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, alice) = server.register_user().await.unwrap();
    let (_, bob) = server.register_user().await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/auth/logout",
            &alice.access_token,
            &RefreshTokenRequest::new(&bob.refresh_token),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "NOT_TOKEN_OWNER");

    // Bob's token survives
    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&bob.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_logout_all() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (register_req, tokens) = server.register_user().await.unwrap();
    let login_req = LoginRequest::from_register(&register_req);
    let second: TokenResponse = assert_json(
        server.post("/api/v1/auth/login", &login_req).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();

    let response = server
        .post_auth(
            "/api/v1/auth/logout-all",
            &tokens.access_token,
            &serde_json::json!({}),
        )
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(message.revoked, Some(2));

    for refresh_token in [&tokens.refresh_token, &second.refresh_token] {
        let response = server
            .post("/api/v1/auth/refresh", &RefreshTokenRequest::new(refresh_token))
            .await
            .unwrap();
        assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    }
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_update_profile() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, tokens) = server.register_user().await.unwrap();
    let (other, _) = server.register_user().await.unwrap();

    let new_name = format!("renamed{}", unique_suffix());
    let response = server
        .put_auth(
            "/api/v1/users/me",
            &tokens.access_token,
            &UpdateUserRequest {
                username: Some(new_name.clone()),
                email: None,
            },
        )
        .await
        .unwrap();
    let user: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(user.username, new_name);

    let response = server
        .put_auth(
            "/api/v1/users/me",
            &tokens.access_token,
            &UpdateUserRequest {
                username: None,
                email: Some(other.email.clone()),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let response = server
        .put_auth(
            "/api/v1/users/me",
            &tokens.access_token,
            &UpdateUserRequest::default(),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_delete_account() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (register_req, tokens) = server.register_user().await.unwrap();

    let response = server
        .delete_auth("/api/v1/users/me", &tokens.access_token)
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(message.message, "User account deleted successfully");

    // Access tokens of an inactive account stop working
    let response = server
        .get_auth("/api/v1/users/me", &tokens.access_token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "USER_INACTIVE");

    // Sessions were revoked
    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&tokens.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&register_req))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_sessions() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (register_req, first) = server.register_user().await.unwrap();
    let second: TokenResponse = assert_json(
        server
            .post("/api/v1/auth/login", &LoginRequest::from_register(&register_req))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();

    let response = server
        .get_auth("/api/v1/users/me/sessions", &second.access_token)
        .await
        .unwrap();
    let sessions: Vec<SessionResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions[0].is_current);
    assert!(!sessions[1].is_current);
    assert_eq!(sessions[0].user_agent.as_deref(), Some("integration-tests"));
    assert_eq!(sessions[0].ip_address.as_deref(), Some("127.0.0.1"));

    // Revoke the older session
    let older = sessions[1].id;
    let response = server
        .delete_auth(
            &format!("/api/v1/users/me/sessions/{older}"),
            &second.access_token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&first.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .delete_auth("/api/v1/users/me/sessions/999999", &second.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .delete_auth("/api/v1/users/me/sessions/abc", &second.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_session_cap_revokes_oldest() {
    let server = TestServer::start_with(&[
        ("RATE_LIMIT_ENABLED", "false"),
        ("MAX_SESSIONS_PER_USER", "2"),
    ])
    .await
    .expect("Failed to start server");
    let (register_req, first) = server.register_user().await.unwrap();
    let login_req = LoginRequest::from_register(&register_req);

    let mut logins: Vec<TokenResponse> = Vec::new();
    for _ in 0..2 {
        logins.push(
            assert_json(
                server.post("/api/v1/auth/login", &login_req).await.unwrap(),
                StatusCode::OK,
            )
            .await
            .unwrap(),
        );
    }
    let latest = logins.last().unwrap();

    let response = server
        .get_auth("/api/v1/users/me/sessions", &latest.access_token)
        .await
        .unwrap();
    let sessions: Vec<SessionResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sessions.len(), 2);

    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest::new(&first.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Admin Tests
// ============================================================================

#[tokio::test]
async fn test_admin_routes_refuse_regular_users() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, tokens) = server.register_user().await.unwrap();

    let response = server
        .get_auth("/api/v1/admin/users", &tokens.access_token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "ADMIN_REQUIRED");
}

#[tokio::test]
async fn test_admin_list_users() {
    let server = TestServer::start().await.expect("Failed to start server");
    let admin = server.login_admin().await.unwrap();
    for _ in 0..3 {
        server.register_user().await.unwrap();
    }

    let response = server
        .get_auth("/api/v1/admin/users?page=1&page_size=3", &admin.access_token)
        .await
        .unwrap();
    let page: PaginatedResponse<UserResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 3);
    assert_eq!(page.total_pages, 2);
    assert!(page.items[0].is_admin);

    let response = server
        .get_auth("/api/v1/admin/users?page_size=101", &admin.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_admin_deactivate_and_activate() {
    let server = TestServer::start().await.expect("Failed to start server");
    let admin = server.login_admin().await.unwrap();
    let (_, tokens) = server.register_user().await.unwrap();

    let me: UserResponse = assert_json(
        server
            .get_auth("/api/v1/auth/me", &tokens.access_token)
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();

    let response = server
        .post_auth(
            &format!("/api/v1/admin/users/{}/deactivate", me.id),
            &admin.access_token,
            &serde_json::json!({}),
        )
        .await
        .unwrap();
    let user: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!user.is_active);

    let response = server
        .get_auth("/api/v1/auth/me", &tokens.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth(
            &format!("/api/v1/admin/users/{}/activate", me.id),
            &admin.access_token,
            &serde_json::json!({}),
        )
        .await
        .unwrap();
    let user: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(user.is_active);

    let response = server
        .get_auth(&format!("/api/v1/admin/users/{}", me.id), &admin.access_token)
        .await
        .unwrap();
    let fetched: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.username, me.username);

    let response = server
        .get_auth("/api/v1/admin/users/424242", &admin.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Rate Limit Tests
// ============================================================================

#[tokio::test]
async fn test_global_rate_limit() {
    let server = TestServer::start_with(&[("RATE_LIMIT_PER_MINUTE", "3")])
        .await
        .expect("Failed to start server");

    for _ in 0..3 {
        let response = server.get("/api/v1/auth/me").await.unwrap();
        assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    }

    let response = server.get("/api/v1/auth/me").await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error.code, "RATE_LIMIT_EXCEEDED");
    assert_eq!(
        body.error.details.unwrap()["retry_after"].as_u64(),
        Some(retry_after)
    );

    // Health checks are never limited
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_login_route_limit() {
    let server = TestServer::start_with(&[]).await.expect("Failed to start server");
    let attempt = LoginRequest {
        username: "nobody_here".to_string(),
        password: "WrongPass999".to_string(),
    };

    for _ in 0..10 {
        let response = server.post("/api/v1/auth/login", &attempt).await.unwrap();
        assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    }

    let response = server.post("/api/v1/auth/login", &attempt).await.unwrap();
    assert_status(response, StatusCode::TOO_MANY_REQUESTS)
        .await
        .unwrap();

    // Other routes still have budget
    let response = server.get("/api/v1/auth/me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_login_rejects_spare_global_budget() {
    let server = TestServer::start_with(&[("RATE_LIMIT_PER_MINUTE", "20")])
        .await
        .expect("Failed to start server");
    let attempt = LoginRequest {
        username: "nobody_here".to_string(),
        password: "WrongPass999".to_string(),
    };

    let mut throttled = 0;
    for _ in 0..20 {
        let response = server.post("/api/v1/auth/login", &attempt).await.unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            throttled += 1;
        }
    }
    assert_eq!(throttled, 10);

    // Ten admitted logins leave ten global slots
    for _ in 0..10 {
        let response = server.get("/api/v1/auth/me").await.unwrap();
        assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    }
    let response = server.get("/api/v1/auth/me").await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_for_separates_clients_when_trusted() {
    let server = TestServer::start_with(&[
        ("RATE_LIMIT_PER_MINUTE", "1"),
        ("TRUST_PROXY_HEADERS", "true"),
    ])
    .await
    .expect("Failed to start server");

    let call = |ip: &'static str| {
        server
            .client
            .get(format!("{}/api/v1/auth/me", server.base_url()))
            .header("x-forwarded-for", ip)
            .send()
    };

    assert_eq!(call("198.51.100.1").await.unwrap().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(call("198.51.100.2").await.unwrap().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        call("198.51.100.1").await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}
