//! Metric descriptions for cart persistence.

use metrics::{Unit, describe_counter};

/// Metric name: snapshot reads, labelled by `outcome` (`loaded`, `missing`, `failed`)
pub const SNAPSHOT_LOADS: &str = "cart.snapshot.loads";
/// Metric name: snapshot writes, labelled by `outcome` (`saved`, `failed`)
pub const SNAPSHOT_WRITES: &str = "cart.snapshot.writes";

/// Register descriptions for the cart metrics and the store metrics underneath.
pub fn describe_cart_metrics() {
    go_marketplace_runtime::metrics::describe_store_metrics();
    describe_counter!(SNAPSHOT_LOADS, Unit::Count, "Cart snapshot reads by outcome");
    describe_counter!(SNAPSHOT_WRITES, Unit::Count, "Cart snapshot writes by outcome");
}
