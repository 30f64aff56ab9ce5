#[cfg(feature = "file-store")]
pub mod file;
pub mod memory;

use crate::dao::storage::StorageResult;

#[cfg(feature = "file-store")]
pub use file::FileStore;
pub use memory::MemoryStore;

/// Durable, synchronous mapping from string keys to serialized JSON documents.
///
/// Every session (player device or scorekeeper) talks to the same store; there is
/// no compare-and-swap, so callers must tolerate interleaved writers.
pub trait KeyValueStore: Send + Sync {
    /// Raw JSON text stored under `key`, if any.
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replace the document stored under `key`.
    fn set_raw(&self, key: &str, value: String) -> StorageResult<()>;
    /// Drop the document stored under `key`; missing keys are not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
