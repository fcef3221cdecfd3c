//! In-process key-value store.

use super::{KvStore, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Map-backed store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all keys currently present, sorted.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()> {
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvStore;
    use crate::store::KvStore;

    #[test]
    fn missing_key_reads_as_none() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn set_many_then_remove() {
        let store = MemoryKvStore::new();
        store
            .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        store.remove("a").unwrap();
        store.remove("never-written").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["b".to_string()]);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }
}
