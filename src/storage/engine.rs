use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Database is closed")]
    Closed,
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database is locked by another handle")]
    Locked,
    #[error("Key not found")]
    NotFound,
    #[error("Database error: {0}")]
    Redb(#[from] redb::Error),
    #[error("Database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
}

/// Ordered byte-keyed storage shared by every repository of a store.
///
/// Keys and values are opaque; record layout belongs to the repositories.
/// Once [`Engine::close`] has returned, every further call (including a
/// second `close`) fails with [`EngineError::Closed`].
pub trait Engine: Send + Sync {
    /// Fetch the value stored under `key`, or [`EngineError::NotFound`].
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, EngineError>;

    /// Durably store `value` under `key`, replacing any previous value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), EngineError>;

    fn has(&self, key: &[u8]) -> Result<bool, EngineError>;

    /// Release the underlying resources (and, for file engines, the file lock).
    fn close(&self) -> Result<(), EngineError>;
}
