//! Snapshot codec for the persisted cart.
//!
//! The snapshot is the whole product list as a UTF-8 JSON array, rewritten
//! on every mutation:
//!
//! ```json
//! [{"id":"1","title":"Mug","image_url":"https://…/mug.png","price":12.5,"quantity":2}]
//! ```
//!
//! Decoding is tolerant of snapshots written by older clients: `imageUrl`
//! is accepted for `image_url`, entries whose quantity dropped below 1 are
//! discarded, and repeated ids are folded into their first occurrence.

use crate::types::{LineItem, ProductId};
use serde::Deserialize;
use thiserror::Error;

/// Storage key of the cart snapshot
pub const SNAPSHOT_KEY: &str = "@GoMarketplace:products";

/// Errors from encoding or decoding a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The stored text is not a valid snapshot
    #[error("Malformed cart snapshot: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The product list could not be serialized
    #[error("Failed to encode cart snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Line item as found in storage, before normalization
#[derive(Deserialize)]
struct StoredItem {
    id: ProductId,
    title: String,
    #[serde(alias = "imageUrl")]
    image_url: String,
    price: f64,
    /// Any JSON number; older clients did not always store integers
    quantity: f64,
}

/// Serialize the product list into snapshot text
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialization fails.
pub fn encode(products: &[LineItem]) -> Result<String, SnapshotError> {
    serde_json::to_string(products).map_err(SnapshotError::Encode)
}

/// Parse snapshot text into a normalized product list
///
/// A JSON `null` decodes to an empty cart.
///
/// # Errors
///
/// Returns [`SnapshotError::Malformed`] if the text is not a JSON array of line items.
pub fn decode(text: &str) -> Result<Vec<LineItem>, SnapshotError> {
    let stored: Option<Vec<StoredItem>> =
        serde_json::from_str(text).map_err(SnapshotError::Malformed)?;

    Ok(normalize(stored.unwrap_or_default()))
}

fn normalize(stored: Vec<StoredItem>) -> Vec<LineItem> {
    let mut products: Vec<LineItem> = Vec::with_capacity(stored.len());

    for item in stored {
        let Some(quantity) = whole_units(item.quantity) else {
            tracing::debug!(id = %item.id, quantity = item.quantity, "Dropping empty line item");
            continue;
        };

        if let Some(existing) = products.iter_mut().find(|p| p.id == item.id) {
            tracing::debug!(id = %item.id, "Merging duplicate line item");
            existing.quantity = existing.quantity.saturating_add(quantity);
            continue;
        }

        products.push(LineItem {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity,
        });
    }

    products
}

/// Whole units in a stored quantity, or `None` below one unit
///
/// Fractions are truncated and values past `u32::MAX` saturate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to 1..=u32::MAX
fn whole_units(quantity: f64) -> Option<u32> {
    if quantity >= 1.0 {
        Some(quantity.min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}
