//! In-memory implementation of RefreshTokenRepository

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use auth_core::entities::{NewRefreshToken, RefreshToken};
use auth_core::error::DomainError;
use auth_core::traits::{RefreshTokenRepository, RepoResult};
use auth_core::value_objects::UserId;

/// `refresh_tokens` table keyed by token value
///
/// `revoke` flips the flag while holding the entry's shard lock, so the
/// check-and-set is a single step.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenRepository {
    by_token: DashMap<String, RefreshToken>,
    id_index: DashMap<i64, String>,
    last_id: AtomicI64,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: &NewRefreshToken) -> RepoResult<RefreshToken> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = RefreshToken {
            id,
            token: token.token.clone(),
            user_id: token.user_id,
            expires_at: token.expires_at,
            revoked: false,
            created_at: token.created_at,
            client: token.client.clone(),
        };

        match self.by_token.entry(token.token.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::DatabaseError(
                    "duplicate refresh token value".to_string(),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
            }
        }
        self.id_index.insert(id, token.token.clone());

        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> RepoResult<Option<RefreshToken>> {
        Ok(self.by_token.get(token).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<RefreshToken>> {
        let Some(token) = self.id_index.get(&id).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        self.find_by_token(&token).await
    }

    async fn revoke(&self, token: &str) -> RepoResult<bool> {
        Ok(match self.by_token.get_mut(token) {
            Some(mut entry) if !entry.revoked => {
                entry.revoked = true;
                true
            }
            _ => false,
        })
    }

    async fn rotate(
        &self,
        old_token: &str,
        replacement: &NewRefreshToken,
    ) -> RepoResult<Option<RefreshToken>> {
        // Insert first so a failed insert leaves the old token live; undo the
        // insert if the old token turns out to be revoked already.
        let record = self.create(replacement).await?;
        if self.revoke(old_token).await? {
            Ok(Some(record))
        } else {
            self.id_index.remove(&record.id);
            self.by_token.remove(&record.token);
            Ok(None)
        }
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let mut count = 0;
        for mut entry in self.by_token.iter_mut() {
            if entry.user_id == user_id && !entry.revoked {
                entry.revoked = true;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn list_live_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<RefreshToken>> {
        let mut live: Vec<RefreshToken> = self
            .by_token
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.is_live_at(now))
            .map(|entry| entry.value().clone())
            .collect();
        live.sort_by_key(|t| (t.created_at, t.id));
        Ok(live)
    }
}
