use std::sync::Arc;

use super::engine::{Engine, EngineError};
use super::store::{StoreError, WriteLock};

pub const COUNTER_KEY: &[u8] = b"counter";

/// The global counter, stored as 8 big-endian bytes under [`COUNTER_KEY`].
///
/// Every operation runs under the injected lock, so increments are totally
/// ordered with respect to each other and to resets.
#[derive(Clone)]
pub struct CounterRepository {
    engine: Arc<dyn Engine>,
    lock: WriteLock,
}

impl CounterRepository {
    pub fn new(engine: Arc<dyn Engine>, lock: WriteLock) -> Self {
        Self { engine, lock }
    }

    /// Current value; a missing record reads as 0 and is not created.
    pub fn get(&self) -> Result<u64, StoreError> {
        let _guard = self.lock.lock();
        self.read()
    }

    /// Add one and return the new value
    pub fn increment(&self) -> Result<u64, StoreError> {
        let _guard = self.lock.lock();
        let value = self
            .read()?
            .checked_add(1)
            .ok_or(StoreError::CounterOverflow)?;
        self.engine.put(COUNTER_KEY, &value.to_be_bytes())?;
        tracing::debug!(value, "Counter incremented");
        Ok(value)
    }

    pub fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        self.engine.put(COUNTER_KEY, &0u64.to_be_bytes())?;
        tracing::debug!("Counter reset");
        Ok(())
    }

    fn read(&self) -> Result<u64, StoreError> {
        match self.engine.get(COUNTER_KEY) {
            Ok(data) => decode_counter(&data),
            Err(EngineError::NotFound) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

fn decode_counter(data: &[u8]) -> Result<u64, StoreError> {
    let bytes: [u8; 8] = data.try_into().map_err(|_| StoreError::Corrupt {
        key: String::from_utf8_lossy(COUNTER_KEY).into_owned(),
        reason: format!("expected 8 bytes, found {}", data.len()),
    })?;
    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Store;
    use crate::testutil::{setup_store, test_hasher};
    use std::collections::HashSet;

    #[test]
    fn test_fresh_counter_reads_zero_without_writing() {
        let (store, _temp) = setup_store();

        assert_eq!(store.counter().get().unwrap(), 0);
        assert!(!store.engine().has(COUNTER_KEY).unwrap());
    }

    #[test]
    fn test_increment_and_reset() {
        let (store, _temp) = setup_store();

        assert_eq!(store.counter().increment().unwrap(), 1);
        assert_eq!(store.counter().increment().unwrap(), 2);
        assert_eq!(store.counter().get().unwrap(), 2);

        store.counter().reset().unwrap();
        assert_eq!(store.counter().get().unwrap(), 0);
        assert_eq!(store.engine().get(COUNTER_KEY).unwrap(), vec![0u8; 8]);

        assert_eq!(store.counter().increment().unwrap(), 1);
    }

    #[test]
    fn test_stored_as_big_endian() {
        let (store, _temp) = setup_store();
        let value: u64 = 0x0102_0304_0506_0708;
        store
            .engine()
            .put(COUNTER_KEY, &(value - 1).to_be_bytes())
            .unwrap();

        assert_eq!(store.counter().increment().unwrap(), value);
        assert_eq!(
            store.engine().get(COUNTER_KEY).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert_eq!(store.counter().get().unwrap(), value);
    }

    #[test]
    fn test_wrong_length_is_corrupt() {
        let (store, _temp) = setup_store();
        store
            .engine()
            .put(COUNTER_KEY, b"this is not a valid uint64 data")
            .unwrap();

        assert!(matches!(
            store.counter().get(),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(matches!(
            store.counter().increment(),
            Err(StoreError::Corrupt { .. })
        ));

        store.counter().reset().unwrap();
        assert_eq!(store.counter().get().unwrap(), 0);
    }

    #[test]
    fn test_increment_refuses_to_wrap() {
        let (store, _temp) = setup_store();
        store
            .engine()
            .put(COUNTER_KEY, &u64::MAX.to_be_bytes())
            .unwrap();

        assert!(matches!(
            store.counter().increment(),
            Err(StoreError::CounterOverflow)
        ));
        assert_eq!(store.counter().get().unwrap(), u64::MAX);
    }

    fn assert_no_lost_updates(store: &Store) {
        const CALLERS: u64 = 100;

        let returned: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..CALLERS)
                .map(|_| {
                    let counter = store.counter();
                    s.spawn(move || counter.increment().unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(store.counter().get().unwrap(), CALLERS);

        let unique: HashSet<u64> = returned.iter().copied().collect();
        assert_eq!(unique.len(), CALLERS as usize);
        assert_eq!(unique, (1..=CALLERS).collect::<HashSet<u64>>());
    }

    #[test]
    fn test_concurrent_increments_on_disk() {
        let (store, _temp) = setup_store();
        assert_no_lost_updates(&store);
    }

    #[test]
    fn test_concurrent_increments_in_memory() {
        let store = Store::in_memory(test_hasher());
        assert_no_lost_updates(&store);
    }

    #[test]
    fn test_independent_stores_do_not_share_state() {
        let first = Store::in_memory(test_hasher());
        let second = Store::in_memory(test_hasher());

        first.counter().increment().unwrap();
        first.counter().increment().unwrap();
        second.counter().increment().unwrap();

        assert_eq!(first.counter().get().unwrap(), 2);
        assert_eq!(second.counter().get().unwrap(), 1);
    }
}
