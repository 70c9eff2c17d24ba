//! In-memory implementation of UserRepository

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use auth_core::entities::{NewUser, User};
use auth_core::error::DomainError;
use auth_core::traits::{RepoResult, UserRepository};
use auth_core::value_objects::UserId;

#[derive(Debug)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Rows by id plus unique indexes on username and email
#[derive(Debug, Default)]
struct UserTable {
    rows: BTreeMap<i64, StoredUser>,
    by_username: HashMap<String, i64>,
    by_email: HashMap<String, i64>,
    last_id: i64,
}

impl UserTable {
    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.by_username
            .get(username)
            .is_some_and(|id| Some(*id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.by_email.get(email).is_some_and(|id| Some(*id) != except)
    }

    fn lookup(&self, id: Option<&i64>) -> Option<User> {
        id.and_then(|id| self.rows.get(id)).map(|row| row.user.clone())
    }
}

/// `users` table held behind a single lock
///
/// Uniqueness checks and the write they guard happen under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self
            .table
            .read()
            .rows
            .get(&id.into_inner())
            .map(|row| row.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let table = self.table.read();
        Ok(table.lookup(table.by_username.get(username)))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let table = self.table.read();
        Ok(table.lookup(table.by_email.get(email)))
    }

    async fn create(
        &self,
        new_user: &NewUser,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<User> {
        let mut table = self.table.write();

        if table.username_taken(&new_user.username, None) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if table.email_taken(&new_user.email, None) {
            return Err(DomainError::EmailAlreadyExists);
        }

        table.last_id += 1;
        let id = table.last_id;
        let user = User {
            id: UserId::new(id),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            is_active: true,
            is_admin: new_user.is_admin,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };

        table.by_username.insert(user.username.clone(), id);
        table.by_email.insert(user.email.clone(), id);
        table.rows.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );

        Ok(user)
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: Option<&str>,
        email: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<User> {
        let mut table = self.table.write();
        let raw_id = id.into_inner();

        if !table.rows.contains_key(&raw_id) {
            return Err(DomainError::UserNotFound(id));
        }
        if username.is_some_and(|u| table.username_taken(u, Some(raw_id))) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if email.is_some_and(|e| table.email_taken(e, Some(raw_id))) {
            return Err(DomainError::EmailAlreadyExists);
        }

        let table = &mut *table;
        let row = table
            .rows
            .get_mut(&raw_id)
            .ok_or(DomainError::UserNotFound(id))?;
        if let Some(username) = username {
            table.by_username.remove(&row.user.username);
            table.by_username.insert(username.to_string(), raw_id);
            row.user.username = username.to_string();
        }
        if let Some(email) = email {
            table.by_email.remove(&row.user.email);
            table.by_email.insert(email.to_string(), raw_id);
            row.user.email = email.to_string();
        }
        row.user.updated_at = now;

        Ok(row.user.clone())
    }

    async fn set_active(&self, id: UserId, active: bool, now: DateTime<Utc>) -> RepoResult<User> {
        let mut table = self.table.write();
        let row = table
            .rows
            .get_mut(&id.into_inner())
            .ok_or(DomainError::UserNotFound(id))?;

        if active {
            row.user.activate(now);
        } else {
            row.user.deactivate(now);
        }

        Ok(row.user.clone())
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self
            .table
            .read()
            .rows
            .get(&id.into_inner())
            .map(|row| row.password_hash.clone()))
    }

    async fn list(&self, offset: i64, limit: i64) -> RepoResult<Vec<User>> {
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(self
            .table
            .read()
            .rows
            .values()
            .skip(offset)
            .take(limit)
            .map(|row| row.user.clone())
            .collect())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.table.read().rows.len() as i64)
    }
}
