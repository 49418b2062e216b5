//! Errors returned by cart operations.

use go_marketplace_runtime::StoreError;
use thiserror::Error;

/// Errors that can occur when changing the cart
///
/// A mutation that fails to persist is still applied in memory; the error
/// only reports that storage does not hold the new snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product descriptor was rejected before touching the cart
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Storage rejected the snapshot write
    #[error("Failed to persist cart: {0}")]
    Persistence(String),

    /// Storage did not acknowledge the snapshot write in time
    #[error("Timed out waiting for cart to persist")]
    PersistenceTimeout,

    /// The underlying store refused the action
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
