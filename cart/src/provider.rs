//! Scoped access to a cart.
//!
//! A [`CartProvider`] owns a [`CartStore`] and makes it available to any
//! code running inside [`CartProvider::provide`] through [`use_cart`],
//! without threading the store through every call. Code that prefers
//! explicit injection takes the store from [`CartProvider::cart`] instead.
//!
//! Calling [`use_cart`] outside a provider is an integration bug and panics.

use crate::config::CartConfig;
use crate::reducer::CartEnvironment;
use crate::store::CartStore;
use std::future::Future;
use tokio::task::JoinHandle;

tokio::task_local! {
    static CURRENT_CART: CartStore;
}

/// Owner of the cart for a UI tree
#[derive(Debug, Clone)]
pub struct CartProvider {
    cart: CartStore,
}

impl CartProvider {
    /// Provide an existing cart
    #[must_use]
    pub const fn new(cart: CartStore) -> Self {
        Self { cart }
    }

    /// Open a cart from storage and provide it
    pub async fn open(env: CartEnvironment, config: &CartConfig) -> Self {
        Self::new(CartStore::open(env, config).await)
    }

    /// The provided cart, for explicit injection
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Run `future` with this cart in scope
    pub async fn provide<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_CART.scope(self.cart.clone(), future).await
    }

    /// Spawn `future` on a new task with this cart in scope
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::spawn(CURRENT_CART.scope(self.cart.clone(), future))
    }
}

/// The cart of the enclosing [`CartProvider`]
///
/// # Panics
///
/// Panics when called outside [`CartProvider::provide`] or [`CartProvider::spawn`].
#[must_use]
#[allow(clippy::panic)] // Misuse outside a provider must fail loudly
pub fn use_cart() -> CartStore {
    try_use_cart().unwrap_or_else(|| panic!("use_cart must be used within a CartProvider"))
}

/// The cart of the enclosing [`CartProvider`], if any
#[must_use]
pub fn try_use_cart() -> Option<CartStore> {
    CURRENT_CART.try_with(Clone::clone).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::types::Product;
    use go_marketplace_testing::mocks::InMemoryStorage;
    use std::sync::Arc;

    fn provider() -> CartProvider {
        let env = CartEnvironment::new(Arc::new(InMemoryStorage::new()));
        CartProvider::new(CartStore::new(env, &CartConfig::default()))
    }

    #[tokio::test]
    async fn test_use_cart_inside_scope_shares_the_provided_cart() {
        let provider = provider();

        provider
            .provide(async {
                use_cart()
                    .add_to_cart(Product::new("a", "Apple", "a.png", 1.0))
                    .await
                    .unwrap();
            })
            .await;

        assert_eq!(provider.cart().products().await.len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_task_sees_the_cart() {
        let provider = provider();

        let found = provider.spawn(async { try_use_cart().is_some() }).await.unwrap();

        assert!(found);
    }

    #[test]
    fn test_try_use_cart_outside_scope_is_none() {
        assert!(try_use_cart().is_none());
    }

    #[test]
    #[should_panic(expected = "use_cart must be used within a CartProvider")]
    fn test_use_cart_outside_scope_panics() {
        let _ = use_cart();
    }
}
