//! File-backed key-value storage.
//!
//! Each key is stored in its own `.dat` file under a base directory. Keys
//! are URL-encoded into file names, so any key (including namespaced keys
//! such as `@GoMarketplace:products`) maps to a single path component.
//! Writes go to a temporary file that is renamed over the target, so a
//! reader sees either the old snapshot or the new one.

use go_marketplace_core::storage::{KeyValueStorage, StorageError, StorageFuture};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Key-value storage keeping one file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `base_path`
    ///
    /// The directory is created on the first write.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Path of the file holding `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.dat", urlencoding::encode(key)))
    }

    /// Temporary file a write of `key` goes through
    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.tmp", urlencoding::encode(key)))
    }

    async fn write_atomic(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path).await?;

        let temp_path = self.temp_path_for(key);
        let result = Self::replace_with(&temp_path, &self.path_for(key), value).await;
        if result.is_err() {
            // Missing is fine; the write may have failed before creating it
            let _ = fs::remove_file(&temp_path).await;
        }
        result
    }

    async fn replace_with(temp_path: &Path, path: &Path, value: &[u8]) -> Result<(), StorageError> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(value).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(temp_path, path).await?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(async move {
            let path = self.path_for(key);
            match fs::read_to_string(&path).await {
                Ok(value) => Ok(Some(value)),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(error) => Err(error.into()),
            }
        })
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.write_atomic(key, value.as_bytes()).await?;
            tracing::trace!(key, bytes = value.len(), "Stored item");
            Ok(())
        })
    }
}
