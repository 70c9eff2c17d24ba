//! PostgreSQL implementation of RefreshTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use auth_core::entities::{NewRefreshToken, RefreshToken};
use auth_core::traits::{RefreshTokenRepository, RepoResult};
use auth_core::value_objects::UserId;

use crate::models::RefreshTokenModel;

use super::error::map_db_error;

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new PgRefreshTokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn create(&self, token: &NewRefreshToken) -> RepoResult<RefreshToken> {
        let model = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            INSERT INTO refresh_tokens (token, user_id, expires_at, revoked, created_at, ip_address, user_agent)
            VALUES ($1, $2, $3, FALSE, $4, $5, $6)
            RETURNING id, token, user_id, expires_at, revoked, created_at, ip_address, user_agent
            ",
        )
        .bind(&token.token)
        .bind(token.user_id.into_inner())
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.client.ip_address.as_deref())
        .bind(token.client.user_agent.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RefreshToken::from(model))
    }

    #[instrument(skip_all)]
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, token, user_id, expires_at, revoked, created_at, ip_address, user_agent
            FROM refresh_tokens
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RefreshToken::from))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, token, user_id, expires_at, revoked, created_at, ip_address, user_agent
            FROM refresh_tokens
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RefreshToken::from))
    }

    #[instrument(skip_all)]
    async fn revoke(&self, token: &str) -> RepoResult<bool> {
        // The row lock taken by UPDATE serializes racing callers; only the
        // first one still sees revoked = FALSE.
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token = $1 AND revoked = FALSE
            ",
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip_all, fields(user_id = %replacement.user_id))]
    async fn rotate(
        &self,
        old_token: &str,
        replacement: &NewRefreshToken,
    ) -> RepoResult<Option<RefreshToken>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let revoked = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token = $1 AND revoked = FALSE
            ",
        )
        .bind(old_token)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if revoked.rows_affected() != 1 {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(None);
        }

        let model = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            INSERT INTO refresh_tokens (token, user_id, expires_at, revoked, created_at, ip_address, user_agent)
            VALUES ($1, $2, $3, FALSE, $4, $5, $6)
            RETURNING id, token, user_id, expires_at, revoked, created_at, ip_address, user_agent
            ",
        )
        .bind(&replacement.token)
        .bind(replacement.user_id.into_inner())
        .bind(replacement.expires_at)
        .bind(replacement.created_at)
        .bind(replacement.client.ip_address.as_deref())
        .bind(replacement.client.user_agent.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Dropping `tx` on an error above rolls the revoke back
        tx.commit().await.map_err(map_db_error)?;
        Ok(Some(RefreshToken::from(model)))
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND revoked = FALSE
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn list_live_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<RefreshToken>> {
        let rows = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, token, user_id, expires_at, revoked, created_at, ip_address, user_agent
            FROM refresh_tokens
            WHERE user_id = $1 AND revoked = FALSE AND expires_at >= $2
            ORDER BY created_at, id
            ",
        )
        .bind(user_id.into_inner())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(RefreshToken::from).collect())
    }
}
