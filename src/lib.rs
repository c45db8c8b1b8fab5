//! counter-auth - A tiny authentication backend guarding a persisted counter
//!
//! This crate provides:
//! - User registration and login with bcrypt-hashed passwords
//! - Stateless HS256 bearer tokens carrying username and role
//! - Role-based admission for protected operations
//! - A redb-backed key-value store with an atomic, lock-serialized counter
//! - REST API

pub mod api;
pub mod config;
pub mod gate;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use config::Config;
use storage::models::Role;
use storage::{Store, StoreError};
use tokens::TokenService;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        let tokens = TokenService::new(config.tokens.signing_key.as_bytes());
        Self {
            config,
            store,
            tokens,
        }
    }
}

pub const ADMIN_USERNAME: &str = "admin";

/// Make sure the `admin` account exists. Returns `true` if it was created by
/// this call; an existing account keeps its current password.
pub fn provision_admin(store: &Store, password: &str) -> Result<bool, StoreError> {
    match store.users().create(ADMIN_USERNAME, password, Role::Admin) {
        Ok(()) => Ok(true),
        Err(StoreError::AlreadyExists) => Ok(false),
        Err(e) => Err(e),
    }
}
