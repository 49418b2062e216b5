//! Reducer logic for the cart.
//!
//! Commands mutate the product list and return a write-through effect that
//! stores the full snapshot taken right after the mutation. Storage results
//! come back as events.

use crate::metrics::{SNAPSHOT_LOADS, SNAPSHOT_WRITES};
use crate::snapshot::{self, SNAPSHOT_KEY};
use crate::types::{CartAction, CartState, LineItem, Product, ProductId};
use go_marketplace_core::{
    SmallVec, effect::Effect, reducer::Reducer, smallvec, storage::KeyValueStorage,
};
use std::sync::Arc;
use tracing::Instrument;

/// Environment dependencies for the cart reducer
#[derive(Clone)]
pub struct CartEnvironment {
    /// Storage holding the snapshot
    pub storage: Arc<dyn KeyValueStorage>,
    /// Key the snapshot is stored under
    pub storage_key: String,
}

impl CartEnvironment {
    /// Creates an environment using the default snapshot key
    ///
    /// [`CartStore`](crate::CartStore) replaces the key with the one in its
    /// [`CartConfig`](crate::CartConfig).
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            storage_key: SNAPSHOT_KEY.to_string(),
        }
    }

    /// Use a different snapshot key
    #[must_use]
    pub(crate) fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

impl std::fmt::Debug for CartEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEnvironment")
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

/// Reducer for the cart
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add_to_cart(state: &mut CartState, product: Product) {
        if let Some(item) = state.get_mut(&product.id) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            state.products.push(LineItem::from_product(product));
        }
    }

    fn increment(state: &mut CartState, id: &ProductId) {
        if let Some(item) = state.get_mut(id) {
            item.quantity = item.quantity.saturating_add(1);
        }
    }

    fn decrement(state: &mut CartState, id: &ProductId) {
        let Some(index) = state.products.iter().position(|item| &item.id == id) else {
            return;
        };

        if state.products[index].quantity > 1 {
            state.products[index].quantity -= 1;
        } else {
            state.products.remove(index);
        }
    }

    /// Effect reading the snapshot from storage
    fn load(env: &CartEnvironment) -> Effect<CartAction> {
        let storage = Arc::clone(&env.storage);
        let key = env.storage_key.clone();
        let span = tracing::debug_span!("snapshot_load", key = %key);

        Effect::future(
            async move {
                let action = match storage.get_item(&key).await {
                    Ok(Some(text)) if !text.trim().is_empty() => match snapshot::decode(&text) {
                        Ok(products) => CartAction::SnapshotLoaded { products },
                        Err(error) => CartAction::LoadFailed {
                            error: error.to_string(),
                        },
                    },
                    Ok(_) => CartAction::SnapshotMissing,
                    Err(error) => CartAction::LoadFailed {
                        error: error.to_string(),
                    },
                };

                let outcome = match &action {
                    CartAction::SnapshotLoaded { products } => {
                        tracing::debug!(items = products.len(), "Loaded cart snapshot");
                        "loaded"
                    },
                    CartAction::LoadFailed { error } => {
                        tracing::warn!(error = %error, "Failed to load cart snapshot");
                        "failed"
                    },
                    _ => {
                        tracing::debug!("No cart snapshot stored");
                        "missing"
                    },
                };
                metrics::counter!(SNAPSHOT_LOADS, "outcome" => outcome).increment(1);

                Some(action)
            }
            .instrument(span),
        )
    }

    /// Effect writing the current product list to storage
    ///
    /// Bumps the revision; the snapshot is captured now, not when the effect runs.
    fn persist(state: &mut CartState, env: &CartEnvironment) -> Effect<CartAction> {
        state.revision += 1;
        let revision = state.revision;
        let encoded = snapshot::encode(&state.products);
        let storage = Arc::clone(&env.storage);
        let key = env.storage_key.clone();
        let span = tracing::debug_span!("snapshot_save", key = %key, revision);

        Effect::future(
            async move {
                let result = match encoded {
                    Ok(text) => storage
                        .set_item(&key, text)
                        .await
                        .map_err(|error| error.to_string()),
                    Err(error) => Err(error.to_string()),
                };

                match result {
                    Ok(()) => {
                        tracing::debug!("Saved cart snapshot");
                        metrics::counter!(SNAPSHOT_WRITES, "outcome" => "saved")
                            .increment(1);
                        Some(CartAction::SnapshotSaved { revision })
                    },
                    Err(error) => {
                        tracing::warn!(error = %error, "Failed to save cart snapshot");
                        metrics::counter!(SNAPSHOT_WRITES, "outcome" => "failed")
                            .increment(1);
                        Some(CartAction::SaveFailed { revision, error })
                    },
                }
            }
            .instrument(span),
        )
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            CartAction::Load => smallvec![Self::load(env)],

            CartAction::AddToCart { product } => {
                if let Err(error) = product.validate() {
                    state.last_error = Some(error);
                    return SmallVec::new();
                }

                Self::add_to_cart(state, product);
                smallvec![Self::persist(state, env)]
            },

            CartAction::Increment { id } => {
                Self::increment(state, &id);
                smallvec![Self::persist(state, env)]
            },

            CartAction::Decrement { id } => {
                Self::decrement(state, &id);
                smallvec![Self::persist(state, env)]
            },

            // ========== Events ==========
            CartAction::SnapshotLoaded { products } => {
                state.products = products;
                state.persisted_revision = state.revision;
                SmallVec::new()
            },

            CartAction::SnapshotMissing => SmallVec::new(),

            CartAction::SnapshotSaved { revision } => {
                state.persisted_revision = state.persisted_revision.max(revision);
                state.last_error = None;
                SmallVec::new()
            },

            CartAction::LoadFailed { error }
            | CartAction::SaveFailed { error, .. }
            | CartAction::ValidationFailed { error } => {
                state.last_error = Some(error);
                SmallVec::new()
            },
        }
    }
}
