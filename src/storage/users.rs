use std::sync::Arc;

use super::engine::{Engine, EngineError};
use super::models::{Role, User};
use super::store::{StoreError, WriteLock};
use crate::tokens::password::{check_length, PasswordHasher};

pub const USER_KEY_PREFIX: &str = "user:";

pub fn user_key(username: &str) -> Vec<u8> {
    format!("{USER_KEY_PREFIX}{username}").into_bytes()
}

/// Accounts keyed by username
#[derive(Clone)]
pub struct UserRepository {
    engine: Arc<dyn Engine>,
    hasher: PasswordHasher,
    lock: WriteLock,
}

impl UserRepository {
    pub fn new(engine: Arc<dyn Engine>, lock: WriteLock, hasher: PasswordHasher) -> Self {
        Self {
            engine,
            hasher,
            lock,
        }
    }

    /// Register a new account. Fails with [`StoreError::AlreadyExists`]
    /// without touching the existing record if the username is taken.
    pub fn create(&self, username: &str, password: &str, role: Role) -> Result<(), StoreError> {
        if username.is_empty() {
            return Err(StoreError::Validation("username is required".to_string()));
        }
        check_length(password)?;

        // bcrypt is slow; keep it outside the lock
        let password_hash = self.hasher.hash(password)?;
        let user = User {
            password_hash,
            role,
            username: username.to_string(),
        };
        let data = rmp_serde::to_vec_named(&user)?;
        let key = user_key(username);

        let _guard = self.lock.lock();
        if self.engine.has(&key)? {
            return Err(StoreError::AlreadyExists);
        }
        self.engine.put(&key, &data)?;

        tracing::debug!(username = %username, role = %role, "Created user");
        Ok(())
    }

    pub fn get(&self, username: &str) -> Result<User, StoreError> {
        self.load(username, &user_key(username))
    }

    /// Replace the password hash of an existing account; username and role
    /// are left untouched.
    pub fn update_password(&self, username: &str, new_password: &str) -> Result<(), StoreError> {
        check_length(new_password)?;
        let password_hash = self.hasher.hash(new_password)?;
        let key = user_key(username);

        let _guard = self.lock.lock();
        let mut user = self.load(username, &key)?;
        user.password_hash = password_hash;
        self.engine.put(&key, &rmp_serde::to_vec_named(&user)?)?;

        tracing::debug!(username = %username, "Updated password");
        Ok(())
    }

    /// Replace the password only if `old_password` matches the stored hash.
    ///
    /// Verification and write happen under one lock acquisition, so of two
    /// concurrent changes presenting the same old password only one succeeds;
    /// the other fails with [`StoreError::InvalidCredentials`].
    pub fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        check_length(old_password)?;
        check_length(new_password)?;
        let password_hash = self.hasher.hash(new_password)?;
        let key = user_key(username);

        let _guard = self.lock.lock();
        let mut user = self.load(username, &key)?;
        if !PasswordHasher::verify(old_password, &user.password_hash) {
            return Err(StoreError::InvalidCredentials);
        }
        user.password_hash = password_hash;
        self.engine.put(&key, &rmp_serde::to_vec_named(&user)?)?;

        tracing::debug!(username = %username, "Changed password");
        Ok(())
    }

    fn load(&self, username: &str, key: &[u8]) -> Result<User, StoreError> {
        match self.engine.get(key) {
            Ok(data) => decode_user(username, &data),
            Err(EngineError::NotFound) => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

fn decode_user(username: &str, data: &[u8]) -> Result<User, StoreError> {
    rmp_serde::from_slice(data).map_err(|e| StoreError::Corrupt {
        key: format!("{USER_KEY_PREFIX}{username}"),
        reason: e.to_string(),
    })
}
