//! Persistent shopping cart for the Go Marketplace storefront.
//!
//! The cart is an ordered list of line items kept in memory and mirrored to
//! a key-value storage slot after every change (write-through). It is built
//! on the reducer architecture:
//!
//! - [`CartReducer`] owns every state transition and describes storage
//!   reads and writes as effects
//! - [`CartStore`] runs the reducer and exposes async operations that
//!   resolve once storage has acknowledged the change
//! - [`CartProvider`] and [`use_cart`] give scoped access to one cart
//! - [`FileStorage`] keeps snapshots on local disk
//!
//! # Quick Start
//!
//! ```no_run
//! use go_marketplace_cart::{CartConfig, CartEnvironment, CartProvider, FileStorage, Product, use_cart};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), go_marketplace_cart::CartError> {
//! let config = CartConfig::from_env();
//! let env = CartEnvironment::new(Arc::new(FileStorage::new(&config.storage_dir)));
//! let provider = CartProvider::open(env, &config).await;
//!
//! provider
//!     .provide(async {
//!         let cart = use_cart();
//!         cart.add_to_cart(Product::new("1", "Mug", "https://example.com/mug.png", 12.5))
//!             .await?;
//!         println!("{} item(s) in cart", cart.products().await.len());
//!         Ok::<_, go_marketplace_cart::CartError>(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod reducer;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::CartConfig;
pub use error::CartError;
pub use provider::{CartProvider, try_use_cart, use_cart};
pub use reducer::{CartEnvironment, CartReducer};
pub use snapshot::SNAPSHOT_KEY;
pub use storage::FileStorage;
pub use store::CartStore;
pub use types::{CartAction, CartState, LineItem, Product, ProductId};
