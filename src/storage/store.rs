use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::counter::CounterRepository;
use super::db::Database;
use super::engine::{Engine, EngineError};
use super::memory::MemoryEngine;
use super::users::UserRepository;
use crate::tokens::password::{CredentialError, PasswordHasher};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User already exists")]
    AlreadyExists,
    #[error("Corrupt record under {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Counter cannot be incremented past u64::MAX")]
    CounterOverflow,
    #[error("{0}")]
    Credential(#[from] CredentialError),
    #[error("Storage error: {0}")]
    Engine(#[from] EngineError),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not found")]
    NotFound,
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    /// True for input the caller should fix (maps to a 4xx, not a 5xx)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::Credential(CredentialError::TooLong)
        )
    }
}

/// Lock serializing the read-modify-write cycles of one store.
///
/// Created once per [`Store`] and handed to each repository, so independent
/// stores (e.g. in parallel tests) never contend with each other.
pub type WriteLock = Arc<Mutex<()>>;

/// The repositories of one engine, sharing that engine's write lock.
#[derive(Clone)]
pub struct Store {
    counter: CounterRepository,
    engine: Arc<dyn Engine>,
    users: UserRepository,
}

impl Store {
    pub fn new(engine: Arc<dyn Engine>, hasher: PasswordHasher) -> Self {
        let lock: WriteLock = Arc::new(Mutex::new(()));
        Self {
            counter: CounterRepository::new(Arc::clone(&engine), Arc::clone(&lock)),
            users: UserRepository::new(Arc::clone(&engine), lock, hasher),
            engine,
        }
    }

    /// Open the durable redb-backed store in `data_dir`
    pub fn open<P: AsRef<Path>>(data_dir: P, hasher: PasswordHasher) -> Result<Self, StoreError> {
        let db = Database::open(data_dir)?;
        Ok(Self::new(Arc::new(db), hasher))
    }

    pub fn in_memory(hasher: PasswordHasher) -> Self {
        Self::new(Arc::new(MemoryEngine::new()), hasher)
    }

    pub fn counter(&self) -> &CounterRepository {
        &self.counter
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn close(&self) -> Result<(), StoreError> {
        Ok(self.engine.close()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::Role;
    use tempfile::TempDir;

    #[test]
    fn test_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let hasher = PasswordHasher::new(4);
        {
            let store = Store::open(temp_dir.path(), hasher).unwrap();
            store.users().create("dana", "pw", Role::Admin).unwrap();
            store.counter().increment().unwrap();
            store.counter().increment().unwrap();
            store.close().unwrap();
        }

        let store = Store::open(temp_dir.path(), hasher).unwrap();
        assert_eq!(store.users().get("dana").unwrap().role, Role::Admin);
        assert_eq!(store.counter().get().unwrap(), 2);
    }

    #[test]
    fn test_second_open_reports_locked() {
        let temp_dir = TempDir::new().unwrap();
        let hasher = PasswordHasher::new(4);
        let _store = Store::open(temp_dir.path(), hasher).unwrap();

        let second = Store::open(temp_dir.path(), hasher);
        assert!(matches!(
            second,
            Err(StoreError::Engine(EngineError::Locked))
        ));
    }

    #[test]
    fn test_closed_store_surfaces_engine_error() {
        let store = Store::in_memory(PasswordHasher::new(4));
        store.close().unwrap();

        assert!(matches!(
            store.counter().get(),
            Err(StoreError::Engine(EngineError::Closed))
        ));
        assert!(matches!(
            store.counter().increment(),
            Err(StoreError::Engine(EngineError::Closed))
        ));
        assert!(matches!(
            store.users().get("anyone"),
            Err(StoreError::Engine(EngineError::Closed))
        ));
        assert!(matches!(
            store.close(),
            Err(StoreError::Engine(EngineError::Closed))
        ));
    }

    #[test]
    fn test_validation_classification() {
        assert!(StoreError::Validation("x".into()).is_validation());
        assert!(StoreError::Credential(CredentialError::TooLong).is_validation());
        assert!(!StoreError::NotFound.is_validation());
        assert!(!StoreError::Engine(EngineError::Closed).is_validation());
    }
}
