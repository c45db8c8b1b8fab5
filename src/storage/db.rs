use parking_lot::RwLock;
use redb::{Database as RedbDatabase, ReadTransaction, WriteTransaction};
use std::path::Path;

use super::engine::{Engine, EngineError};
use super::tables::KV;

/// File name of the store inside the data directory
pub const DB_FILE_NAME: &str = "counter-auth.redb";

/// Durable [`Engine`] backed by a redb file.
///
/// redb holds an exclusive lock on the file for as long as the handle is
/// open, so a second `open` on the same directory fails with
/// [`EngineError::Locked`] until this one is closed.
pub struct Database {
    db: RwLock<Option<RedbDatabase>>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, EngineError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join(DB_FILE_NAME);
        let db = match RedbDatabase::create(db_path) {
            Ok(db) => db,
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => return Err(EngineError::Locked),
            Err(e) => return Err(e.into()),
        };

        // Read transactions cannot open a table that was never created
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: RwLock::new(Some(db)),
        })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, EngineError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(EngineError::Closed)?;
        Ok(db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, EngineError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(EngineError::Closed)?;
        Ok(db.begin_write()?)
    }

    pub fn is_closed(&self) -> bool {
        self.db.read().is_none()
    }
}

impl Engine for Database {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, EngineError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(KV)?;

        match table.get(key)? {
            Some(data) => Ok(data.value().to_vec()),
            None => Err(EngineError::NotFound),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), EngineError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn has(&self, key: &[u8]) -> Result<bool, EngineError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(KV)?;
        Ok(table.get(key)?.is_some())
    }

    fn close(&self) -> Result<(), EngineError> {
        let db = self.db.write().take().ok_or(EngineError::Closed)?;
        drop(db);
        tracing::debug!("Database closed");
        Ok(())
    }
}
