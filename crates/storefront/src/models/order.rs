//! Order history domain types.
//!
//! Orders are immutable historical records: their items snapshot the product
//! name, image, and unit price at purchase time, so later catalog changes
//! cannot rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidepool_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::user::Address;

/// A historical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub payment_method: String,
    pub total_amount: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// One purchased line within an order, frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image: String,
    pub quantity: u32,
    /// Unit price paid (effective price at purchase time).
    pub price: Price,
}
