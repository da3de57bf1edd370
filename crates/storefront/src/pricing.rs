//! Checkout total computation.
//!
//! Pure derivations over a cart snapshot: nothing here reads or mutates store
//! state, and no total is ever cached apart from the lines it derives from.
//! Amounts accumulate at full decimal precision; rounding to currency
//! precision happens only when a [`Price`] is displayed.

use tidepool_core::Price;

use crate::config::PricingConfig;
use crate::models::{CartLine, CartSnapshot};

/// Derived totals for a cart at checkout or display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
}

impl CheckoutSummary {
    /// The all-zero summary of an empty cart.
    pub const EMPTY: Self = Self {
        subtotal: Price::ZERO,
        tax: Price::ZERO,
        shipping: Price::ZERO,
        total: Price::ZERO,
    };
}

/// The total for one line: effective unit price times quantity.
#[must_use]
pub fn line_total(line: &CartLine) -> Price {
    line.product.effective_price() * line.quantity
}

/// Derive subtotal, tax, shipping, and total for a cart snapshot.
///
/// Shipping is free strictly above the threshold; an empty cart owes
/// nothing at all, including shipping.
#[must_use]
pub fn summarize(snapshot: &CartSnapshot, config: &PricingConfig) -> CheckoutSummary {
    if snapshot.is_empty() {
        return CheckoutSummary::EMPTY;
    }

    let subtotal: Price = snapshot.lines.iter().map(line_total).sum();
    let tax = subtotal * config.tax_rate;
    let shipping = if subtotal > config.free_shipping_threshold {
        Price::ZERO
    } else {
        config.shipping_fee
    };
    let total = subtotal + tax + shipping;

    CheckoutSummary {
        subtotal,
        tax,
        shipping,
        total,
    }
}
