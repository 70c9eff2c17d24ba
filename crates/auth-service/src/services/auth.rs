//! Authentication service
//!
//! Handles user registration, login, token refresh, and logout.

use auth_common::{validate_password_strength, AppError};
use auth_core::{ClientMeta, DomainError, NewUser, UserId};
use tracing::{info, instrument, warn};

use crate::dto::{
    normalize_username, LoginRequest, LogoutRequest, MessageResponse, RefreshTokenRequest,
    RegisterRequest, TokenResponse, UserResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::session::SessionService;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new `AuthService`
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn sessions(&self) -> SessionService<'a> {
        SessionService::new(self.ctx)
    }

    /// Register a new user and log them in
    #[instrument(skip(self, request, meta), fields(username = %request.username, email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
        meta: ClientMeta,
    ) -> ServiceResult<TokenResponse> {
        let username = normalize_username(&request.username)?;
        validate_password_strength(&request.password)?;
        let email = request.email.trim().to_string();

        if self.ctx.user_repo().find_by_username(&username).await?.is_some() {
            return Err(DomainError::UsernameAlreadyExists.into());
        }
        if self.ctx.user_repo().find_by_email(&email).await?.is_some() {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = self.ctx.password_service().hash(&request.password)?;

        // The repository re-checks uniqueness atomically
        let user = self
            .ctx
            .user_repo()
            .create(&NewUser::new(username, email), &password_hash, self.ctx.now())
            .await?;

        info!(user_id = %user.id, "User registered successfully");

        self.sessions().issue(&user, meta).await
    }

    /// Login with username and password
    ///
    /// Unknown users and wrong passwords fail identically.
    #[instrument(skip(self, request, meta), fields(username = %request.username))]
    pub async fn login(
        &self,
        request: LoginRequest,
        meta: ClientMeta,
    ) -> ServiceResult<TokenResponse> {
        let username = request.username.trim();

        let Some(user) = self.ctx.user_repo().find_by_username(username).await? else {
            warn!(username, ip_address = ?meta.ip_address, "Login failed: user not found");
            let err = self.ctx.password_service().reject_unknown(&request.password);
            return Err(err.into());
        };

        let Some(password_hash) = self.ctx.user_repo().get_password_hash(user.id).await? else {
            warn!(user_id = %user.id, "Login failed: no password hash");
            let err = self.ctx.password_service().reject_unknown(&request.password);
            return Err(err.into());
        };

        if let Err(err) = self
            .ctx
            .password_service()
            .verify_or_error(&request.password, &password_hash)
        {
            if matches!(err, AppError::InvalidCredentials) {
                warn!(user_id = %user.id, ip_address = ?meta.ip_address, "Login failed: invalid password");
            }
            return Err(err.into());
        }

        if !user.is_active() {
            warn!(user_id = %user.id, "Login refused: account inactive");
            return Err(DomainError::UserInactive.into());
        }

        info!(user_id = %user.id, "User logged in successfully");

        self.sessions().issue(&user, meta).await
    }

    /// Exchange a refresh token under the configured rotation policy
    #[instrument(skip(self, request, meta))]
    pub async fn refresh(
        &self,
        request: RefreshTokenRequest,
        meta: ClientMeta,
    ) -> ServiceResult<TokenResponse> {
        let rotate = self.ctx.session_config().rotate_refresh_tokens;
        self.sessions()
            .refresh(&request.refresh_token, meta, rotate)
            .await
    }

    /// Revoke the given refresh token
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn logout(
        &self,
        request: LogoutRequest,
        user_id: UserId,
    ) -> ServiceResult<MessageResponse> {
        self.sessions()
            .logout(&request.refresh_token, user_id)
            .await?;

        Ok(MessageResponse::new("Successfully logged out"))
    }

    /// Revoke every session of the user
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn logout_all(&self, user_id: UserId) -> ServiceResult<MessageResponse> {
        let revoked = self.sessions().revoke_all(user_id).await?;

        Ok(MessageResponse::new("Logged out from all sessions").with_revoked(revoked))
    }

    /// Current user profile
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: UserId) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        Ok(UserResponse::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::ServiceError;
    use crate::services::test_support::{harness, harness_with, TEST_PASSWORD};
    use auth_common::SessionConfig;
    use std::time::Instant;

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username.trim()),
            password: TEST_PASSWORD.to_string(),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_working_tokens() {
        let h = harness();
        let auth = AuthService::new(&h.ctx);

        let tokens = auth
            .register(register_request("  newuser "), ClientMeta::default())
            .await
            .unwrap();

        let identity = SessionService::new(&h.ctx)
            .verify_access(&tokens.access_token)
            .await
            .unwrap();
        assert_eq!(identity.user.username, "newuser");
        assert!(identity.user.is_active);
        assert!(!identity.user.is_admin);
        assert!(!identity.user.email_verified);
    }

    #[tokio::test]
    async fn test_register_duplicates_conflict() {
        let h = harness();
        let auth = AuthService::new(&h.ctx);
        auth.register(register_request("alice"), ClientMeta::default())
            .await
            .unwrap();

        let same_name = auth
            .register(register_request("alice"), ClientMeta::default())
            .await
            .unwrap_err();
        assert_eq!(same_name.status_code(), 409);
        assert_eq!(same_name.to_string(), "Username already exists");

        let mut same_email = register_request("alice2");
        same_email.email = "alice@example.com".to_string();
        let err = auth
            .register(same_email, ClientMeta::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let h = harness();
        let auth = AuthService::new(&h.ctx);

        let err = auth
            .register(register_request("bad name"), ClientMeta::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let mut weak = register_request("weakling");
        weak.password = "alllowercase1".to_string();
        let err = auth.register(weak, ClientMeta::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_login_success() {
        let h = harness();
        h.user("alice").await;

        let tokens = AuthService::new(&h.ctx)
            .login(login_request("alice", TEST_PASSWORD), ClientMeta::default())
            .await
            .unwrap();
        assert!(!tokens.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let h = harness();
        h.user("alice").await;
        let auth = AuthService::new(&h.ctx);

        let wrong_password = auth
            .login(login_request("alice", "WrongPass123"), ClientMeta::default())
            .await
            .unwrap_err();
        let unknown_user = auth
            .login(login_request("nobody", TEST_PASSWORD), ClientMeta::default())
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ServiceError::App(AppError::InvalidCredentials)));
        assert!(matches!(unknown_user, ServiceError::App(AppError::InvalidCredentials)));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.status_code(), 401);
    }

    #[tokio::test]
    async fn test_unknown_user_costs_a_password_check() {
        let h = harness();
        h.user("alice").await;
        let auth = AuthService::new(&h.ctx);
        // Build the throwaway hash outside the timed calls
        let _ = auth
            .login(login_request("nobody", TEST_PASSWORD), ClientMeta::default())
            .await;

        let started = Instant::now();
        let wrong_password = auth
            .login(login_request("alice", "WrongPass123"), ClientMeta::default())
            .await;
        let wrong_password_took = started.elapsed();

        let started = Instant::now();
        let unknown_user = auth
            .login(login_request("nobody", "WrongPass123"), ClientMeta::default())
            .await;
        let unknown_user_took = started.elapsed();

        assert!(matches!(wrong_password, Err(ServiceError::App(AppError::InvalidCredentials))));
        assert!(matches!(unknown_user, Err(ServiceError::App(AppError::InvalidCredentials))));
        // A skipped hash check is orders of magnitude faster than a real one
        assert!(unknown_user_took * 10 >= wrong_password_took);
    }

    #[tokio::test]
    async fn test_login_inactive_user() {
        let h = harness();
        let alice = h.user("alice").await;
        h.ctx
            .user_repo()
            .set_active(alice.id, false, h.ctx.now())
            .await
            .unwrap();
        let auth = AuthService::new(&h.ctx);

        let err = auth
            .login(login_request("alice", TEST_PASSWORD), ClientMeta::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "Account is inactive");

        // A wrong password on an inactive account reveals nothing more
        let err = auth
            .login(login_request("alice", "WrongPass123"), ClientMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::App(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_follows_rotation_setting() {
        let h = harness_with(SessionConfig {
            rotate_refresh_tokens: false,
            ..SessionConfig::default()
        });
        h.user("alice").await;
        let auth = AuthService::new(&h.ctx);
        let tokens = auth
            .login(login_request("alice", TEST_PASSWORD), ClientMeta::default())
            .await
            .unwrap();

        let refreshed = auth
            .refresh(
                RefreshTokenRequest {
                    refresh_token: tokens.refresh_token.clone(),
                },
                ClientMeta::default(),
            )
            .await
            .unwrap();
        assert_eq!(refreshed.refresh_token, tokens.refresh_token);
    }

    #[tokio::test]
    async fn test_logout_and_logout_all() {
        let h = harness();
        let alice = h.user("alice").await;
        let auth = AuthService::new(&h.ctx);

        let first = auth
            .login(login_request("alice", TEST_PASSWORD), ClientMeta::default())
            .await
            .unwrap();
        auth.login(login_request("alice", TEST_PASSWORD), ClientMeta::default())
            .await
            .unwrap();
        auth.login(login_request("alice", TEST_PASSWORD), ClientMeta::default())
            .await
            .unwrap();

        let message = auth
            .logout(
                LogoutRequest {
                    refresh_token: first.refresh_token,
                },
                alice.id,
            )
            .await
            .unwrap();
        assert_eq!(message.message, "Successfully logged out");

        let all = auth.logout_all(alice.id).await.unwrap();
        assert_eq!(all.revoked, Some(2));
    }

    #[tokio::test]
    async fn test_me() {
        let h = harness();
        let alice = h.user("alice").await;
        let auth = AuthService::new(&h.ctx);

        let me = auth.me(alice.id).await.unwrap();
        assert_eq!(me.username, "alice");
        assert_eq!(me.email, "alice@example.com");

        let err = auth.me(UserId::new(404)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
