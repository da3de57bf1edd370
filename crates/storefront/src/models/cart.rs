//! Cart line and snapshot types.

use serde::{Deserialize, Serialize};

use super::product::Product;

/// One product-quantity pairing within a cart.
///
/// The cart holds at most one line per product id; `quantity` is always at
/// least 1 (a line that would drop to 0 is removed instead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Value snapshot of the product at add-to-cart time.
    pub product: Product,
    pub quantity: u32,
}

/// A read-only copy of cart state at a point in time.
///
/// Used for derived computations (pricing, badges) without holding the cart
/// lock.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
    /// Sum of line quantities (the navigation badge count).
    pub item_count: u32,
}

impl CartSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
