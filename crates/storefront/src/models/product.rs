//! Product and category domain types.
//!
//! Products are immutable from the cart's perspective: the catalog owns them,
//! cart lines carry value snapshots of them.

use serde::{Deserialize, Serialize};

use tidepool_core::{CategoryId, Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable unique identifier.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Base price.
    pub price: Price,
    /// Optional sale price. Conventionally at most `price`; not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Price>,
    /// Category this product belongs to.
    pub category: CategoryId,
    /// Free-form tags; order carries no meaning.
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: String,
    /// Average review rating (display only).
    pub rating: f64,
    /// Number of reviews (display only).
    pub review_count: u32,
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    /// The price a buyer actually pays: the discounted price when present,
    /// otherwise the base price.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.discounted_price.unwrap_or(self.price)
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL-facing identifier (e.g., `electronics`).
    pub slug: String,
}
