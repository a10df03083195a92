//! Credential store: the only owner of user records
//!
//! Wraps a [`UserStore`] with password hashing. Plaintext passwords enter here and
//! never leave; everything stored or returned carries only the Argon2 hash.

use crate::{
    auth::PasswordHasher,
    error::AppError,
    models::user::{NewUser, User, UserChanges},
    repository::{StoreError, UniqueField, UserStore},
};
use chrono::NaiveDate;
use std::sync::Arc;

/// Profile fields a user may change; `password` is plaintext here
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    /// Verified for unknown usernames so both failure paths do the same work
    dummy_hash: Arc<str>,
}

impl CredentialStore {
    /// Fails if the placeholder hash cannot be computed
    pub fn new(users: Arc<dyn UserStore>) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new();
        let dummy_hash = hasher.hash("timing-equalisation-placeholder")?;

        Ok(Self {
            users,
            hasher,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_user_by_username(username).await?)
    }

    /// Returns the user only if the password matches.
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AppError> {
        match self.users.find_user_by_username(username).await? {
            Some(user) if self.hasher.verify(password, &user.password_hash) => Ok(user),
            Some(_) => {
                tracing::debug!(username = %username, "Password mismatch");
                Err(AppError::InvalidCredentials)
            }
            None => {
                self.hasher.verify(password, &self.dummy_hash);
                tracing::debug!(username = %username, "Unknown username");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Register a new account. Uniqueness is decided by the store, not checked up front.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        email: &str,
        birthday: Option<NaiveDate>,
    ) -> Result<User, AppError> {
        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                email: email.to_string(),
                birthday,
            })
            .await
            .map_err(|e| conflict_error(e, username))?;

        tracing::info!(username = %user.username, user_id = %user.id, "User registered");
        Ok(user)
    }

    /// `Ok(None)` when the account does not exist
    pub async fn update(
        &self,
        username: &str,
        changes: ProfileChanges,
    ) -> Result<Option<User>, AppError> {
        let password_hash = match changes.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };
        let attempted_name = changes.username.clone().unwrap_or_else(|| username.to_string());

        let updated = self
            .users
            .update_user(
                username,
                UserChanges {
                    username: changes.username,
                    password_hash,
                    email: changes.email,
                    birthday: changes.birthday,
                },
            )
            .await
            .map_err(|e| conflict_error(e, &attempted_name))?;

        if let Some(user) = &updated {
            tracing::info!(username = %username, new_username = %user.username, "User updated");
        }
        Ok(updated)
    }

    pub async fn delete(&self, username: &str) -> Result<bool, AppError> {
        let deleted = self.users.delete_user(username).await?;
        if deleted {
            tracing::info!(username = %username, "User deleted");
        }
        Ok(deleted)
    }
}

/// Duplicate username is a 400 naming the username; duplicate email is a validation failure
fn conflict_error(err: StoreError, username: &str) -> AppError {
    match err {
        StoreError::Conflict(UniqueField::Username) => {
            AppError::Conflict(format!("{} already exists", username))
        }
        StoreError::Conflict(UniqueField::Email) => AppError::validation("Email is already in use"),
        other => other.into(),
    }
}
