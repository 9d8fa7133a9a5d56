use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Logical key the trained model is stored under.
pub const MODEL_KEY: &str = "pipeline-failure-model";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no blob stored under key '{key}'")]
    NotFound { key: String },

    #[error("blob store I/O error: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// BlobStore – opaque key → bytes persistence
// ---------------------------------------------------------------------------

/// Minimal key-value store for serialized model blobs.
pub trait BlobStore {
    fn put(&mut self, key: &str, blob: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// One file per key inside a directory: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn put(&mut self, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        fs::write(self.path_for(key), blob)?;
        log::debug!("Stored {} bytes under '{key}' in {}", blob.len(), self.dir.display());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, used by tests and as a scratch store.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        self.blobs.insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryBlobStore::default();
        store.put(MODEL_KEY, b"weights").unwrap();
        assert_eq!(store.get(MODEL_KEY).unwrap(), b"weights".to_vec());
    }

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryBlobStore::default();
        let err = store.get(MODEL_KEY).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "no blob stored under key 'pipeline-failure-model'"
        );
    }

    #[test]
    fn test_file_store_creates_dir_and_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileBlobStore::new(temp_dir.path().join("nested").join("models"));

        store.put(MODEL_KEY, b"first").unwrap();
        store.put(MODEL_KEY, b"second").unwrap();

        assert_eq!(store.get(MODEL_KEY).unwrap(), b"second".to_vec());
        assert!(store.dir().join("pipeline-failure-model.json").exists());
    }

    #[test]
    fn test_file_store_missing_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(temp_dir.path());
        assert!(matches!(
            store.get("absent"),
            Err(StoreError::NotFound { key }) if key == "absent"
        ));
    }
}
