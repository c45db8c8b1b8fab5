use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::engine::{Engine, EngineError};

/// In-memory [`Engine`] with the same closed-handle semantics as the redb one.
/// Nothing survives the process; intended for tests.
pub struct MemoryEngine {
    entries: RwLock<Option<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Some(BTreeMap::new())),
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MemoryEngine {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, EngineError> {
        let guard = self.entries.read();
        let entries = guard.as_ref().ok_or(EngineError::Closed)?;
        entries.get(key).cloned().ok_or(EngineError::NotFound)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), EngineError> {
        let mut guard = self.entries.write();
        let entries = guard.as_mut().ok_or(EngineError::Closed)?;
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn has(&self, key: &[u8]) -> Result<bool, EngineError> {
        let guard = self.entries.read();
        let entries = guard.as_ref().ok_or(EngineError::Closed)?;
        Ok(entries.contains_key(key))
    }

    fn close(&self) -> Result<(), EngineError> {
        self.entries
            .write()
            .take()
            .map(|_| ())
            .ok_or(EngineError::Closed)
    }
}
