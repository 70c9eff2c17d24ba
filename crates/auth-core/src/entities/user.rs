//! User entity - an account that can authenticate

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// User account
///
/// The password verifier is deliberately not part of the entity; repositories
/// hand it out separately through `UserRepository::get_password_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the account may authenticate
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Check if the account has admin rights
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Soft delete: flip the active flag off
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    /// Re-enable a previously deactivated account
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.updated_at = now;
    }
}

/// Fields needed to create a user; the store assigns the ID and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl NewUser {
    /// A regular (non-admin) account
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            is_admin: false,
        }
    }

    /// Mark the new account as admin
    #[must_use]
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}
