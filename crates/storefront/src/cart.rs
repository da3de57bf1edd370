//! Shopping cart store.
//!
//! The cart holds ordered line items (insertion order preserved for display)
//! with at most one line per product id and every quantity at least 1. All
//! operations are total functions over the current state: unknown product ids
//! are silent no-ops, and there is no error channel. Every mutation persists
//! the full line sequence through the bridge before returning.

use std::sync::{Arc, PoisonError, RwLock};

use tidepool_core::ProductId;

use crate::models::{CartLine, CartSnapshot, Product};
use crate::notify::{Notification, Notifier};
use crate::persist::PersistenceBridge;

/// The cart store.
pub struct CartStore {
    lines: RwLock<Vec<CartLine>>,
    bridge: Arc<PersistenceBridge>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Create the cart, rehydrating any persisted line sequence.
    ///
    /// Malformed persisted state yields an empty cart; the failure never
    /// reaches the caller.
    #[must_use]
    pub fn restore(bridge: Arc<PersistenceBridge>, notifier: Arc<dyn Notifier>) -> Self {
        let lines = bridge.load_cart();
        if !lines.is_empty() {
            tracing::debug!(lines = lines.len(), "rehydrated cart");
        }
        Self {
            lines: RwLock::new(lines),
            bridge,
            notifier,
        }
    }

    /// Add one unit of `product` to the cart.
    pub fn add(&self, product: &Product) {
        self.add_item(product, 1);
    }

    /// Add `quantity` units of `product` to the cart.
    ///
    /// If a line for the product already exists its quantity is incremented
    /// in place, preserving the line's original position; otherwise a new
    /// line is appended. A zero quantity is rejected as a no-op: the cart
    /// never constructs an invalid line.
    pub fn add_item(&self, product: &Product, quantity: u32) {
        if quantity == 0 {
            tracing::debug!(product_id = %product.id, "ignoring add with zero quantity");
            return;
        }

        {
            let mut lines = self.write_lines();
            if let Some(line) = lines.iter_mut().find(|l| l.product.id == product.id) {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                lines.push(CartLine {
                    product: product.clone(),
                    quantity,
                });
            }
            self.bridge.save_cart(&lines);
        }

        self.notifier.notify(Notification::new(
            "Added to cart",
            format!("{} has been added to your cart.", product.name),
        ));
    }

    /// Replace the quantity of the line for `product_id`.
    ///
    /// A quantity of 0 removes the line entirely; the cart never stores a
    /// non-positive quantity. Unknown ids are a silent no-op.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: u32) {
        let mut lines = self.write_lines();
        let Some(index) = lines.iter().position(|l| l.product.id == *product_id) else {
            return;
        };

        if quantity == 0 {
            lines.remove(index);
        } else if let Some(line) = lines.get_mut(index) {
            line.quantity = quantity;
        }
        self.bridge.save_cart(&lines);
    }

    /// Remove the line for `product_id`, if present.
    pub fn remove_item(&self, product_id: &ProductId) {
        let removed = {
            let mut lines = self.write_lines();
            let before = lines.len();
            lines.retain(|l| l.product.id != *product_id);
            let removed = lines.len() != before;
            if removed {
                self.bridge.save_cart(&lines);
            }
            removed
        };

        if removed {
            self.notifier.notify(Notification::new(
                "Item removed",
                "The item has been removed from your cart.",
            ));
        }
    }

    /// Empty the cart.
    pub fn clear(&self) {
        {
            let mut lines = self.write_lines();
            lines.clear();
            self.bridge.save_cart(&lines);
        }

        self.notifier.notify(Notification::new(
            "Cart cleared",
            "All items have been removed from your cart.",
        ));
    }

    /// A read-only copy of the current lines plus the derived item count.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        let lines = self.read_lines().clone();
        let item_count = lines.iter().map(|l| l.quantity).sum();
        CartSnapshot { lines, item_count }
    }

    /// Sum of line quantities (the navigation badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.read_lines().iter().map(|l| l.quantity).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.read_lines().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_lines().is_empty()
    }

    fn read_lines(&self) -> std::sync::RwLockReadGuard<'_, Vec<CartLine>> {
        self.lines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lines(&self) -> std::sync::RwLockWriteGuard<'_, Vec<CartLine>> {
        self.lines.write().unwrap_or_else(PoisonError::into_inner)
    }
}
