//! Key-value storage trait for persisted snapshots.
//!
//! Feature stores persist their state by writing a serialized snapshot under a
//! well-known key and reading it back on startup. This module defines the
//! minimal contract those effects rely on, modelled after the asynchronous
//! key-value facilities mobile platforms provide:
//!
//! - Read the text stored under a key (or learn that nothing is stored)
//! - Write text under a key, fully replacing previous contents
//!
//! # Implementations
//!
//! - `FileStorage` (in `go-marketplace-cart`): one file per key on local disk
//! - `InMemoryStorage` (in `go-marketplace-testing`): fast, deterministic tests
//!
//! # Example
//!
//! ```no_run
//! use go_marketplace_core::storage::{KeyValueStorage, StorageError};
//!
//! async fn example<S: KeyValueStorage>(storage: &S) -> Result<(), StorageError> {
//!     storage.set_item("@App:greeting", "hello".to_string()).await?;
//!     let value = storage.get_item("@App:greeting").await?;
//!     assert_eq!(value.as_deref(), Some("hello"));
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by storage operations.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing medium failed (disk full, file unreadable, ...).
    #[error("I/O error: {0}")]
    Io(String),

    /// The process is not allowed to access the storage slot.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The storage backend is not available (closed, unmounted, ...).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(error.to_string()),
            _ => Self::Io(error.to_string()),
        }
    }
}

/// Asynchronous key-value storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn KeyValueStorage>` and captured by effects running on spawned tasks.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be used as a trait object inside reducer environments.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored under the key yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend rejects the write.
    fn set_item<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()>;
}
