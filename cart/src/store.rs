//! The cart facade used by UI code.
//!
//! [`CartStore`] wraps a runtime [`Store`] running the [`CartReducer`] and
//! turns its fire-and-observe model into plain async calls: every mutation
//! resolves once storage has acknowledged (or rejected) the snapshot it
//! produced. Operations are serialized, so snapshots reach storage in the
//! order the mutations happened. An operation whose write outlives the save
//! timeout returns early, but the next operation still waits for that write.

use crate::config::CartConfig;
use crate::error::CartError;
use crate::reducer::{CartEnvironment, CartReducer};
use crate::types::{CartAction, CartState, LineItem, Product, ProductId};
use go_marketplace_runtime::{EffectHandle, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, broadcast, watch};

/// Shared, persistent shopping cart
///
/// Cloning is cheap; clones share state, storage and the operation queue.
///
/// # Example
///
/// ```no_run
/// use go_marketplace_cart::{CartConfig, CartEnvironment, CartStore, FileStorage, Product};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), go_marketplace_cart::CartError> {
/// let config = CartConfig::from_env();
/// let env = CartEnvironment::new(Arc::new(FileStorage::new(&config.storage_dir)));
/// let cart = CartStore::open(env, &config).await;
///
/// cart.add_to_cart(Product::new("1", "Mug", "https://example.com/mug.png", 12.5)).await?;
/// cart.increment(&"1".into()).await?;
/// assert_eq!(cart.products().await[0].quantity, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CartStore {
    store: Store<CartState, CartAction, CartEnvironment, CartReducer>,
    operations: Arc<Mutex<()>>,
    products_tx: Arc<watch::Sender<Vec<LineItem>>>,
    save_timeout: Duration,
}

impl CartStore {
    /// Create an empty cart backed by the storage in `env`
    ///
    /// The snapshot is kept under `config.storage_key`. Nothing is read from
    /// storage until [`load`](Self::load) is called.
    #[must_use]
    pub fn new(env: CartEnvironment, config: &CartConfig) -> Self {
        let store = Store::with_config(
            CartState::new(),
            CartReducer::new(),
            env.with_storage_key(config.storage_key.as_str()),
            config.store_config(),
        );
        let (products_tx, _) = watch::channel(Vec::new());

        Self {
            store,
            operations: Arc::new(Mutex::new(())),
            products_tx: Arc::new(products_tx),
            save_timeout: config.save_timeout,
        }
    }

    /// Create a cart and populate it from storage
    pub async fn open(env: CartEnvironment, config: &CartConfig) -> Self {
        let cart = Self::new(env, config);
        cart.load().await;
        cart
    }

    /// Replace the in-memory cart with the persisted snapshot
    ///
    /// A missing snapshot leaves the cart as it is. Read and decode failures
    /// are logged and recorded in [`last_error`](Self::last_error) but never
    /// returned.
    #[tracing::instrument(skip(self), name = "cart_load")]
    pub async fn load(&self) {
        let operation = self.begin().await;

        match self
            .request(operation, CartAction::Load, CartAction::is_load_result)
            .await
        {
            Ok(CartAction::LoadFailed { error }) => {
                tracing::warn!(error = %error, "Starting with an empty cart");
            },
            Ok(_) => {},
            Err(error) => {
                tracing::warn!(error = %error, "Cart snapshot was not loaded");
            },
        }

        self.publish().await;
    }

    /// Add one unit of `product`
    ///
    /// A product already in the cart keeps its stored title, image and price.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidProduct`]: the descriptor was rejected; nothing changed
    /// - [`CartError::Persistence`]: the cart changed but storage rejected the snapshot
    /// - [`CartError::PersistenceTimeout`]: the cart changed but storage did not answer in time
    /// - [`CartError::Store`]: the cart is shutting down
    #[tracing::instrument(skip(self, product), fields(id = %product.id), name = "cart_add")]
    pub async fn add_to_cart(&self, product: Product) -> Result<(), CartError> {
        if let Err(error) = product.validate() {
            self.store
                .send(CartAction::ValidationFailed {
                    error: error.clone(),
                })
                .await?;
            return Err(CartError::InvalidProduct(error));
        }

        self.mutate(CartAction::AddToCart { product }).await
    }

    /// Add one unit to the item with `id`
    ///
    /// An unknown id leaves the cart unchanged; the snapshot is still written.
    ///
    /// # Errors
    ///
    /// See [`add_to_cart`](Self::add_to_cart).
    #[tracing::instrument(skip(self, id), fields(id = %id), name = "cart_increment")]
    pub async fn increment(&self, id: &ProductId) -> Result<(), CartError> {
        self.mutate(CartAction::Increment { id: id.clone() }).await
    }

    /// Remove one unit from the item with `id`
    ///
    /// The item leaves the cart when its last unit is removed. An unknown id
    /// leaves the cart unchanged; the snapshot is still written.
    ///
    /// # Errors
    ///
    /// See [`add_to_cart`](Self::add_to_cart).
    #[tracing::instrument(skip(self, id), fields(id = %id), name = "cart_decrement")]
    pub async fn decrement(&self, id: &ProductId) -> Result<(), CartError> {
        self.mutate(CartAction::Decrement { id: id.clone() }).await
    }

    /// Current line items in insertion order
    pub async fn products(&self) -> Vec<LineItem> {
        self.store.state(|s| s.products.clone()).await
    }

    /// Full copy of the current state
    pub async fn state(&self) -> CartState {
        self.store.state(Clone::clone).await
    }

    /// Whether storage holds the latest mutation
    pub async fn is_persisted(&self) -> bool {
        self.store.state(CartState::is_persisted).await
    }

    /// Last load, save or validation failure
    pub async fn last_error(&self) -> Option<String> {
        self.store.state(|s| s.last_error.clone()).await
    }

    /// Subscribe to the product list
    ///
    /// The receiver is updated after every completed operation.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Vec<LineItem>> {
        self.products_tx.subscribe()
    }

    /// Wait for in-flight writes and stop accepting operations
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if writes are still running after the
    /// configured shutdown timeout.
    pub async fn shutdown(&self) -> Result<(), CartError> {
        let _operation = self.begin().await;
        let timeout = self.store.config().default_shutdown_timeout;
        self.store.shutdown(timeout).await?;
        Ok(())
    }

    /// Send a persisting command and wait for its acknowledgement
    async fn mutate(&self, action: CartAction) -> Result<(), CartError> {
        let operation = self.begin().await;

        // Every persisting command bumps the revision exactly once
        let expected = self.store.state(|s| s.revision).await + 1;
        let ack = self
            .request(operation, action, |a| match a {
                CartAction::SnapshotSaved { revision } | CartAction::SaveFailed { revision, .. } => {
                    *revision == expected
                },
                _ => false,
            })
            .await;

        self.publish().await;

        match ack {
            Ok(CartAction::SaveFailed { error, .. }) => Err(CartError::Persistence(error)),
            Ok(_) => Ok(()),
            Err(StoreError::Timeout) => {
                tracing::warn!(revision = expected, "Cart snapshot write not acknowledged in time");
                Err(CartError::PersistenceTimeout)
            },
            Err(error) => Err(error.into()),
        }
    }

    /// Take the operation lock
    async fn begin(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.operations).lock_owned().await
    }

    /// Send `action` and wait up to the save timeout for the feedback
    /// matching `predicate`
    ///
    /// `operation` is released only once every effect of `action` has
    /// finished. When the wait times out, a background task keeps holding it
    /// until the effect completes, so the next operation cannot overtake a
    /// slow write.
    async fn request<F>(
        &self,
        operation: OwnedMutexGuard<()>,
        action: CartAction,
        predicate: F,
    ) -> Result<CartAction, StoreError>
    where
        F: Fn(&CartAction) -> bool,
    {
        // Subscribe before sending so the feedback cannot be missed
        let mut actions = self.store.subscribe_actions();
        let mut handle = self.store.send(action).await?;

        match tokio::time::timeout(self.save_timeout, wait_for(&mut actions, predicate)).await {
            Ok(result) => {
                handle.wait().await;
                result
            },
            Err(_) => {
                self.release_when_done(operation, handle);
                Err(StoreError::Timeout)
            },
        }
    }

    /// Hold `operation` on a background task until `handle` completes
    fn release_when_done(&self, operation: OwnedMutexGuard<()>, mut handle: EffectHandle) {
        let cart = self.clone();
        tokio::spawn(async move {
            handle.wait().await;
            tracing::debug!("Late storage result applied");
            cart.publish().await;
            drop(operation);
        });
    }

    async fn publish(&self) {
        let products = self.products().await;
        self.products_tx.send_replace(products);
    }
}

/// First action on `actions` matching `predicate`
async fn wait_for<F>(
    actions: &mut broadcast::Receiver<CartAction>,
    predicate: F,
) -> Result<CartAction, StoreError>
where
    F: Fn(&CartAction) -> bool,
{
    loop {
        match actions.recv().await {
            Ok(action) if predicate(&action) => return Ok(action),
            Ok(_) => {},
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Cart observer lagged, {} actions skipped", skipped);
            },
            Err(broadcast::error::RecvError::Closed) => return Err(StoreError::ChannelClosed),
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("save_timeout", &self.save_timeout)
            .finish_non_exhaustive()
    }
}
