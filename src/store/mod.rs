//! Persistence behind small repository traits so the engine can run against
//! an in-memory fake as easily as against files on disk.

pub mod sessions;
pub mod settings;

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;

pub use sessions::{BlobSessionStore, SessionStore};
pub use settings::{BlobSettingsStore, Settings, SettingsPatch, SettingsStore, Theme};

/// Minimal string key-value storage
pub trait BlobStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// Stores every key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_blob_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = FileBlobStore::with_dir(dir.path().join("nested"));

        assert_eq!(store.read("k"), None);
        store.write("k", "[1,2]").unwrap();
        assert_eq!(store.read("k").as_deref(), Some("[1,2]"));
        assert!(store.path_for("k").exists());

        store.remove("k").unwrap();
        assert_eq!(store.read("k"), None);
        // removing twice is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn memory_blob_roundtrip() {
        let mut store = MemoryBlobStore::new();
        store.write("a", "1").unwrap();
        assert_eq!(store.read("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.read("a"), None);
    }
}
