//! Process-local storage adapter.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::ports::{KeyValueStorage, StorageError};
use crate::domain::tracking::lock_state;

/// Keeps values in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    /// Every stored entry, for assertions.
    pub fn entries(&self) -> BTreeMap<String, String> {
        lock_state(&self.values).clone()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock_state(&self.values).get(key).cloned())
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        lock_state(&self.values).extend(entries);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        lock_state(&self.values).clear();
        Ok(())
    }
}
