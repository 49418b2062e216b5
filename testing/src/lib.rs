//! # Go Marketplace Testing
//!
//! Testing utilities and helpers for the Go Marketplace state containers.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use go_marketplace_testing::mocks::InMemoryStorage;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn cart_survives_restart() {
//!     let storage = Arc::new(InMemoryStorage::new());
//!     let cart = CartStore::open(CartEnvironment::new(storage.clone()), &config).await;
//!     cart.add_to_cart(product).await?;
//!
//!     let reopened = CartStore::open(CartEnvironment::new(storage), &config).await;
//!     assert_eq!(reopened.products().await.len(), 1);
//! }
//! ```

pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use go_marketplace_core::storage::{KeyValueStorage, StorageError, StorageFuture};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory key-value storage for deterministic tests
    ///
    /// Behaves like a device storage slot: values survive as long as the
    /// `InMemoryStorage` does, so sharing one instance (behind an `Arc`)
    /// between two stores simulates an app restart.
    ///
    /// Reads and writes can be made to fail, or to stall, to exercise error
    /// and timeout paths.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use go_marketplace_core::storage::KeyValueStorage;
    /// use go_marketplace_testing::mocks::InMemoryStorage;
    ///
    /// # async fn example() {
    /// let storage = InMemoryStorage::new();
    /// storage.set_item("@App:key", "value".to_string()).await.ok();
    /// assert_eq!(storage.value("@App:key").as_deref(), Some("value"));
    /// assert_eq!(storage.write_count(), 1);
    /// # }
    /// ```
    #[derive(Debug, Default)]
    pub struct InMemoryStorage {
        items: Mutex<HashMap<String, String>>,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        read_delay_ms: AtomicU64,
        write_delay_ms: AtomicU64,
        writes: AtomicUsize,
    }

    impl InMemoryStorage {
        /// Create an empty storage
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a storage with one value already stored
        #[must_use]
        pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
            let storage = Self::new();
            storage.insert(key, value);
            storage
        }

        /// Store a value directly, bypassing failure injection and write counting
        pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
            self.lock().insert(key.into(), value.into());
        }

        /// Current value under `key`
        #[must_use]
        pub fn value(&self, key: &str) -> Option<String> {
            self.lock().get(key).cloned()
        }

        /// Make subsequent reads fail (or succeed again)
        pub fn set_fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        /// Make subsequent writes fail (or succeed again)
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Delay every subsequent read by `delay`
        ///
        /// The delay is sampled when a read starts; changing it does not
        /// affect reads already in flight.
        pub fn set_read_delay(&self, delay: Duration) {
            self.read_delay_ms.store(millis(delay), Ordering::SeqCst);
        }

        /// Delay every subsequent write by `delay`
        ///
        /// The delay is sampled when a write starts; changing it does not
        /// affect writes already in flight.
        pub fn set_write_delay(&self, delay: Duration) {
            self.write_delay_ms.store(millis(delay), Ordering::SeqCst);
        }

        /// Number of successful `set_item` calls
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
            // A poisoned map is still a valid map for tests
            self.items
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    fn millis(delay: Duration) -> u64 {
        u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
    }

    async fn stall(delay_ms: &AtomicU64) {
        let delay = delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    impl KeyValueStorage for InMemoryStorage {
        fn get_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
            Box::pin(async move {
                stall(&self.read_delay_ms).await;
                if self.fail_reads.load(Ordering::SeqCst) {
                    return Err(StorageError::Io(format!("injected read failure for {key}")));
                }
                Ok(self.value(key))
            })
        }

        fn set_item<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
            Box::pin(async move {
                stall(&self.write_delay_ms).await;
                if self.fail_writes.load(Ordering::SeqCst) {
                    return Err(StorageError::Io(format!("injected write failure for {key}")));
                }
                self.lock().insert(key.to_string(), value);
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::mocks::InMemoryStorage;
    use go_marketplace_core::storage::{KeyValueStorage, StorageError};
    use std::time::Duration;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get_item("@App:missing").await, Ok(None));
    }

    #[tokio::test]
    async fn set_item_replaces_previous_value() {
        let storage = InMemoryStorage::with_item("@App:key", "old");

        storage.set_item("@App:key", "new".to_string()).await.ok();

        assert_eq!(storage.get_item("@App:key").await, Ok(Some("new".to_string())));
        assert_eq!(storage.write_count(), 1);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_io_errors() {
        let storage = InMemoryStorage::with_item("@App:key", "kept");
        storage.set_fail_reads(true);
        storage.set_fail_writes(true);

        assert!(matches!(storage.get_item("@App:key").await, Err(StorageError::Io(_))));
        assert!(matches!(
            storage.set_item("@App:key", "lost".to_string()).await,
            Err(StorageError::Io(_))
        ));
        assert_eq!(storage.value("@App:key").as_deref(), Some("kept"));
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn delay_applies_to_writes_started_while_set() {
        let storage = std::sync::Arc::new(InMemoryStorage::new());
        storage.set_write_delay(Duration::from_millis(100));

        let slow = {
            let storage = std::sync::Arc::clone(&storage);
            tokio::spawn(async move { storage.set_item("@App:key", "slow".to_string()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        storage.set_write_delay(Duration::ZERO);

        assert_eq!(storage.value("@App:key"), None);
        slow.await.unwrap().unwrap();
        assert_eq!(storage.value("@App:key").as_deref(), Some("slow"));
    }
}
