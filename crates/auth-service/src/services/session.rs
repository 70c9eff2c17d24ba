//! Session service
//!
//! Owns the refresh-token lifecycle: issuing token pairs, rotating refresh
//! tokens, revoking them, and verifying access tokens. A refresh token only
//! ever moves `Live -> Revoked`; expiry is derived from the clock at use time.

use auth_common::generate_refresh_token;
use auth_core::{ClientMeta, DomainError, NewRefreshToken, RefreshToken, TokenStatus, User, UserId};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::dto::{SessionResponse, TokenResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Who an access token speaks for
#[derive(Debug, Clone)]
pub struct AccessIdentity {
    pub user: User,
    /// Refresh token record the access token was minted with
    pub session_id: i64,
}

impl AccessIdentity {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

/// Session service
pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    /// Create a new `SessionService`
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a fresh access/refresh token pair for `user`
    ///
    /// When the user already holds the maximum number of live sessions the
    /// oldest ones are revoked first.
    #[instrument(skip(self, user, meta), fields(user_id = %user.id))]
    pub async fn issue(&self, user: &User, meta: ClientMeta) -> ServiceResult<TokenResponse> {
        if !user.is_active() {
            return Err(DomainError::UserInactive.into());
        }

        let now = self.ctx.now();
        self.enforce_session_cap(user.id, now).await?;

        let record = self
            .ctx
            .refresh_token_repo()
            .create(&self.new_refresh_token(user.id, meta, now))
            .await?;
        let response = self.token_pair(user.id, record, now)?;

        info!(user_id = %user.id, "Session issued");
        Ok(response)
    }

    /// Exchange a refresh token for a new access token
    ///
    /// With `rotate` the presented token is revoked and a new one returned;
    /// of several concurrent calls on the same token only one can win.
    #[instrument(skip(self, raw_token, meta))]
    pub async fn refresh(
        &self,
        raw_token: &str,
        meta: ClientMeta,
        rotate: bool,
    ) -> ServiceResult<TokenResponse> {
        let now = self.ctx.now();
        let stored = self
            .ctx
            .refresh_token_repo()
            .find_by_token(raw_token)
            .await?
            .ok_or(DomainError::RefreshTokenNotFound)?;

        match stored.status(now) {
            TokenStatus::Live => {}
            TokenStatus::Revoked => {
                warn!(
                    user_id = %stored.user_id,
                    session_id = stored.id,
                    ip_address = ?meta.ip_address,
                    "Revoked refresh token presented"
                );
                return Err(DomainError::RefreshTokenRevoked.into());
            }
            TokenStatus::Expired => {
                debug!(session_id = stored.id, "Expired refresh token presented");
                return Err(DomainError::RefreshTokenExpired.into());
            }
        }

        let user = self
            .ctx
            .user_repo()
            .find_by_id(stored.user_id)
            .await?
            .ok_or(DomainError::UserNotFound(stored.user_id))?;

        if !user.is_active() {
            return Err(DomainError::UserInactive.into());
        }

        if !rotate {
            let session_id = stored.id;
            let access_token = self
                .ctx
                .jwt_service()
                .issue_access_token(user.id, session_id, now)?;
            debug!(user_id = %user.id, session_id, "Access token refreshed without rotation");
            return Ok(TokenResponse::new(
                access_token,
                stored.token,
                self.ctx.jwt_service().access_token_ttl_secs(),
            ));
        }

        let replacement = self.new_refresh_token(user.id, meta, now);
        let Some(record) = self
            .ctx
            .refresh_token_repo()
            .rotate(raw_token, &replacement)
            .await?
        else {
            warn!(
                user_id = %user.id,
                session_id = stored.id,
                "Refresh token revoked by a concurrent request"
            );
            return Err(DomainError::RefreshTokenRevoked.into());
        };

        info!(
            user_id = %user.id,
            old_session_id = stored.id,
            session_id = record.id,
            "Refresh token rotated"
        );

        self.token_pair(user.id, record, now)
    }

    /// Revoke a refresh token on behalf of its owner
    ///
    /// Revoking an already revoked token succeeds. Expiry is not checked.
    #[instrument(skip(self, raw_token), fields(user_id = %user_id))]
    pub async fn logout(&self, raw_token: &str, user_id: UserId) -> ServiceResult<()> {
        let stored = self
            .ctx
            .refresh_token_repo()
            .find_by_token(raw_token)
            .await?
            .ok_or(DomainError::RefreshTokenNotFound)?;

        self.revoke_owned(&stored, user_id).await
    }

    /// Verify an access token and load the live user behind it
    ///
    /// Never touches the refresh token store.
    #[instrument(skip(self, raw_token))]
    pub async fn verify_access(&self, raw_token: &str) -> ServiceResult<AccessIdentity> {
        let claims = self
            .ctx
            .jwt_service()
            .verify_access_token(raw_token, self.ctx.now())?;
        let user_id = claims.user_id()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        if !user.is_active() {
            return Err(DomainError::UserInactive.into());
        }

        Ok(AccessIdentity {
            user,
            session_id: claims.sid,
        })
    }

    /// Revoke every live refresh token the user holds
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn revoke_all(&self, user_id: UserId) -> ServiceResult<u64> {
        let revoked = self
            .ctx
            .refresh_token_repo()
            .revoke_all_for_user(user_id)
            .await?;

        info!(user_id = %user_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// The user's live sessions, newest first
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_sessions(
        &self,
        user_id: UserId,
        current_session_id: Option<i64>,
    ) -> ServiceResult<Vec<SessionResponse>> {
        let live = self
            .ctx
            .refresh_token_repo()
            .list_live_for_user(user_id, self.ctx.now())
            .await?;

        Ok(live
            .iter()
            .rev()
            .map(|token| SessionResponse::from_token(token, current_session_id))
            .collect())
    }

    /// Revoke one of the user's sessions by record id
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn revoke_session(&self, user_id: UserId, session_id: i64) -> ServiceResult<()> {
        let stored = self
            .ctx
            .refresh_token_repo()
            .find_by_id(session_id)
            .await?
            .ok_or(DomainError::SessionNotFound(session_id))?;

        self.revoke_owned(&stored, user_id).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn revoke_owned(&self, stored: &RefreshToken, user_id: UserId) -> ServiceResult<()> {
        if !stored.is_owned_by(user_id) {
            warn!(
                user_id = %user_id,
                owner_id = %stored.user_id,
                session_id = stored.id,
                "Attempt to revoke another user's session"
            );
            return Err(DomainError::NotTokenOwner.into());
        }

        if stored.revoked {
            debug!(session_id = stored.id, "Session already revoked");
            return Ok(());
        }

        // Losing a race here still leaves the token revoked
        self.ctx.refresh_token_repo().revoke(&stored.token).await?;
        info!(user_id = %user_id, session_id = stored.id, "Session revoked");
        Ok(())
    }

    async fn enforce_session_cap(&self, user_id: UserId, now: DateTime<Utc>) -> ServiceResult<()> {
        let max = self.ctx.session_config().max_sessions_per_user;
        if max == 0 {
            return Ok(());
        }

        let live = self
            .ctx
            .refresh_token_repo()
            .list_live_for_user(user_id, now)
            .await?;
        if live.len() < max {
            return Ok(());
        }

        let excess = live.len() + 1 - max;
        for oldest in live.iter().take(excess) {
            self.ctx.refresh_token_repo().revoke(&oldest.token).await?;
            debug!(user_id = %user_id, session_id = oldest.id, "Session evicted by cap");
        }

        info!(user_id = %user_id, evicted = excess, "Session cap reached");
        Ok(())
    }

    fn new_refresh_token(
        &self,
        user_id: UserId,
        client: ClientMeta,
        now: DateTime<Utc>,
    ) -> NewRefreshToken {
        NewRefreshToken {
            token: generate_refresh_token(),
            user_id,
            expires_at: now + self.ctx.refresh_token_ttl(),
            created_at: now,
            client,
        }
    }

    fn token_pair(
        &self,
        user_id: UserId,
        record: RefreshToken,
        now: DateTime<Utc>,
    ) -> ServiceResult<TokenResponse> {
        let access_token = self
            .ctx
            .jwt_service()
            .issue_access_token(user_id, record.id, now)?;

        Ok(TokenResponse::new(
            access_token,
            record.token,
            self.ctx.jwt_service().access_token_ttl_secs(),
        ))
    }
}
