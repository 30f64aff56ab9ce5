use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use crate::dao::storage::{StorageError, StorageResult};

use super::KeyValueStore;

/// Process-local store backed by a concurrent map.
///
/// Writes can be switched off to reproduce a full or disabled browser store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
    reject_writes: AtomicBool,
}

#[derive(Debug, thiserror::Error)]
#[error("writes are disabled")]
struct WritesDisabled;

impl MemoryStore {
    /// Empty, writable store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set_raw`/`remove` fail until re-enabled.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self, key: &str) -> StorageResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                format!("cannot write `{key}`"),
                WritesDisabled,
            ));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set_raw(&self, key: &str, value: String) -> StorageResult<()> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_writable(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_removes_documents() {
        let store = MemoryStore::new();
        store.set_raw("k", "[1,2]".into()).unwrap();
        assert_eq!(store.get_raw("k").unwrap().as_deref(), Some("[1,2]"));
        store.remove("k").unwrap();
        assert!(store.get_raw("k").unwrap().is_none());
        store.remove("k").unwrap();
    }

    #[test]
    fn rejected_writes_surface_unavailable() {
        let store = MemoryStore::new();
        store.set_raw("k", "1".into()).unwrap();
        store.set_reject_writes(true);

        let err = store.set_raw("k", "2".into()).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
        assert_eq!(store.get_raw("k").unwrap().as_deref(), Some("1"));

        store.set_reject_writes(false);
        store.set_raw("k", "2".into()).unwrap();
    }
}
