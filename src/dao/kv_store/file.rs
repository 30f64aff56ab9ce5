//! Directory-backed store keeping one JSON document per key.

use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use uuid::Uuid;

use crate::dao::storage::{StorageError, StorageResult};

use super::KeyValueStore;

const DOCUMENT_EXTENSION: &str = "json";

/// Failures that can occur while touching the store directory.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The store directory could not be created.
    #[error("failed to create store directory `{path}`")]
    CreateDir {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// A document could not be read.
    #[error("failed to read `{path}`")]
    Read {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// A document could not be written or moved into place.
    #[error("failed to write `{path}`")]
    Write {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// A document could not be deleted.
    #[error("failed to remove `{path}`")]
    Remove {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// Store that survives process restarts by writing under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: Arc<Path>,
}

impl FileStore {
    /// Open (and create if needed) the store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| FileStoreError::CreateDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root: Arc::from(root.as_path()),
        })
    }

    /// Directory holding the documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{DOCUMENT_EXTENSION}", encode_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.document_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FileStoreError::Read { path, source }.into()),
        }
    }

    fn set_raw(&self, key: &str, value: String) -> StorageResult<()> {
        let path = self.document_path(key);
        // Readers never observe a half-written document: write aside, then rename.
        let staging = self
            .root
            .join(format!(".{}.tmp", Uuid::new_v4().simple()));
        fs::write(&staging, value).map_err(|source| FileStoreError::Write {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            FileStoreError::Write {
                path: path.clone(),
                source,
            }
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.document_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FileStoreError::Remove { path, source }.into()),
        }
    }
}

/// Map a logical key onto a portable file name.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' => encoded.push(byte as char),
            other => encoded.push_str(&format!("_{other:02x}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("skins-file-store-{}", Uuid::new_v4().simple()))
    }

    #[test]
    fn documents_survive_reopen() {
        let dir = scratch_dir();
        {
            let store = FileStore::open(&dir).unwrap();
            store.set_raw("skins.round", "{\"hole\":3}".into()).unwrap();
        }

        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(
            reopened.get_raw("skins.round").unwrap().as_deref(),
            Some("{\"hole\":3}")
        );
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_documents_read_as_none_and_remove_is_idempotent() {
        let dir = scratch_dir();
        let store = FileStore::open(&dir).unwrap();
        assert!(store.get_raw("absent").unwrap().is_none());
        store.remove("absent").unwrap();
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn keys_are_encoded_into_safe_file_names() {
        assert_eq!(encode_key("skins.entry.abc-1"), "skins.entry.abc-1");
        assert_eq!(encode_key("a/b c"), "a_2fb_20c");
    }
}
