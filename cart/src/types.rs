//! Domain types for the cart.
//!
//! A cart is an ordered list of line items, unique by product id. Commands
//! come from the UI; events come back from storage effects.

use serde::{Deserialize, Serialize};

/// Identifier of a catalog product
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a `ProductId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A product descriptor as shown in the catalog (no quantity)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Image shown next to the product
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price in currency units
    pub price: f64,
}

impl Product {
    /// Creates a new product descriptor
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Checks that the descriptor can be put in a cart
    ///
    /// # Errors
    ///
    /// Returns a message when the id is blank or the price is negative or not finite.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("Product id cannot be empty".to_string());
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!(
                "Product {} has invalid price {}",
                self.id, self.price
            ));
        }

        Ok(())
    }
}

/// One product entry in the cart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier, unique within a cart
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Image shown next to the product
    pub image_url: String,
    /// Unit price in currency units
    pub price: f64,
    /// Number of units, at least 1 while the item is in the cart
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item for a product with quantity 1
    #[must_use]
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }

    /// Price of all units of this item
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// State of the cart
#[derive(Clone, Debug, Default)]
pub struct CartState {
    /// Line items in insertion order
    pub products: Vec<LineItem>,
    /// Bumped on every mutation
    pub revision: u64,
    /// Revision of the last snapshot storage acknowledged
    pub persisted_revision: u64,
    /// Last load, save or validation failure (if any)
    pub last_error: Option<String>,
}

impl CartState {
    /// Creates an empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cart holding the given items, as if loaded from storage
    #[must_use]
    pub fn with_products(products: Vec<LineItem>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    /// Number of distinct products
    #[must_use]
    pub fn count(&self) -> usize {
        self.products.len()
    }

    /// Number of units across all products
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.products.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Price of everything in the cart
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.products.iter().map(LineItem::subtotal).sum()
    }

    /// Returns the line item for a product
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.products.iter().find(|item| &item.id == id)
    }

    /// Whether the last mutation has been written to storage
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.persisted_revision == self.revision
    }

    pub(crate) fn get_mut(&mut self, id: &ProductId) -> Option<&mut LineItem> {
        self.products.iter_mut().find(|item| &item.id == id)
    }
}

/// Actions for the cart reducer
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    // Commands
    /// Read the persisted snapshot into memory
    Load,
    /// Add one unit of a product
    AddToCart {
        /// Product to add
        product: Product,
    },
    /// Add one unit to an item already in the cart
    Increment {
        /// Item to change
        id: ProductId,
    },
    /// Remove one unit from an item; an item at quantity 1 leaves the cart
    Decrement {
        /// Item to change
        id: ProductId,
    },

    // Events
    /// The persisted snapshot was read and decoded
    SnapshotLoaded {
        /// Items from the snapshot
        products: Vec<LineItem>,
    },
    /// No snapshot exists yet
    SnapshotMissing,
    /// Reading or decoding the snapshot failed
    LoadFailed {
        /// Failure message
        error: String,
    },
    /// Storage accepted the snapshot for a revision
    SnapshotSaved {
        /// Revision the snapshot was taken at
        revision: u64,
    },
    /// Storage rejected the snapshot for a revision
    SaveFailed {
        /// Revision the snapshot was taken at
        revision: u64,
        /// Failure message
        error: String,
    },
    /// A command was rejected before touching state
    ValidationFailed {
        /// Failure message
        error: String,
    },
}

impl CartAction {
    /// Whether this action ends a `Load`
    #[must_use]
    pub const fn is_load_result(&self) -> bool {
        matches!(
            self,
            Self::SnapshotLoaded { .. } | Self::SnapshotMissing | Self::LoadFailed { .. }
        )
    }

    /// Whether this action ends a snapshot write
    #[must_use]
    pub const fn is_save_result(&self) -> bool {
        matches!(self, Self::SnapshotSaved { .. } | Self::SaveFailed { .. })
    }
}
