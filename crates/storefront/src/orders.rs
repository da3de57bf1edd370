//! Order history store.
//!
//! History is a fixed demo fixture plus the orders placed in this client
//! context. Fixture orders never persist; placed orders mirror through the
//! bridge like the rest of the client state.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use tidepool_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use crate::models::{Address, CartSnapshot, Order, OrderItem};
use crate::persist::PersistenceBridge;
use crate::pricing::CheckoutSummary;

/// The order history store.
pub struct OrderStore {
    fixture: Vec<Order>,
    placed: RwLock<Vec<Order>>,
    bridge: Arc<PersistenceBridge>,
}

impl OrderStore {
    /// Create the store, rehydrating any locally placed orders.
    #[must_use]
    pub fn restore(bridge: Arc<PersistenceBridge>) -> Self {
        let placed = bridge.load_orders();
        if !placed.is_empty() {
            tracing::debug!(orders = placed.len(), "rehydrated placed orders");
        }
        Self {
            fixture: demo_orders(),
            placed: RwLock::new(placed),
            bridge,
        }
    }

    /// All orders for a user, fixture first, then locally placed, each in
    /// original order.
    #[must_use]
    pub fn orders_for_user(&self, user_id: &UserId) -> Vec<Order> {
        let placed = self.read_placed();
        self.fixture
            .iter()
            .chain(placed.iter())
            .filter(|o| o.user_id == *user_id)
            .cloned()
            .collect()
    }

    /// Look up a single order by id.
    #[must_use]
    pub fn by_id(&self, order_id: &OrderId) -> Option<Order> {
        let placed = self.read_placed();
        self.fixture
            .iter()
            .chain(placed.iter())
            .find(|o| o.id == *order_id)
            .cloned()
    }

    /// Record a new order from a cart snapshot.
    ///
    /// Items freeze the product name, image, and effective unit price at
    /// purchase time; the order total is the calculator's total for the same
    /// snapshot. The new order is persisted before this returns.
    #[must_use]
    pub fn create_order(
        &self,
        user_id: UserId,
        snapshot: &CartSnapshot,
        shipping_address: Address,
        payment_method: impl Into<String>,
        summary: &CheckoutSummary,
    ) -> Order {
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(format!("ord-{}", Uuid::new_v4())),
            user_id,
            items: snapshot
                .lines
                .iter()
                .map(|line| OrderItem {
                    product_id: line.product.id.clone(),
                    product_name: line.product.name.clone(),
                    product_image: line.product.image.clone(),
                    quantity: line.quantity,
                    price: line.product.effective_price(),
                })
                .collect(),
            status: OrderStatus::Pending,
            shipping_address,
            payment_method: payment_method.into(),
            total_amount: summary.total,
            created_at: now,
            updated_at: now,
            tracking_number: None,
            estimated_delivery: None,
        };

        let mut placed = self.write_placed();
        placed.push(order.clone());
        self.bridge.save_orders(&placed);
        drop(placed);

        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
        order
    }

    fn read_placed(&self) -> std::sync::RwLockReadGuard<'_, Vec<Order>> {
        self.placed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_placed(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Order>> {
        self.placed.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// The fixed demo order history for `user-1`.
fn demo_orders() -> Vec<Order> {
    let shipping_address = Address {
        street: "123 Main St".to_string(),
        city: "Anytown".to_string(),
        state: "CA".to_string(),
        zip_code: "12345".to_string(),
        country: "United States".to_string(),
    };

    vec![
        Order {
            id: OrderId::new("ord-1"),
            user_id: UserId::new("user-1"),
            items: vec![
                OrderItem {
                    product_id: ProductId::new("p1"),
                    product_name: "Premium Wireless Headphones".to_string(),
                    product_image: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?auto=format&fit=crop&w=1000&q=80".to_string(),
                    quantity: 1,
                    price: Price::from_cents(24999),
                },
                OrderItem {
                    product_id: ProductId::new("p3"),
                    product_name: "Smart Fitness Watch".to_string(),
                    product_image: "https://images.unsplash.com/photo-1575311373937-040b8e3fd243?auto=format&fit=crop&w=1000&q=80".to_string(),
                    quantity: 1,
                    price: Price::from_cents(16999),
                },
            ],
            status: OrderStatus::Delivered,
            shipping_address: shipping_address.clone(),
            payment_method: "Credit Card".to_string(),
            total_amount: Price::from_cents(41998),
            created_at: date(2023, 7, 15),
            updated_at: date(2023, 7, 20),
            tracking_number: Some("TRK123456789".to_string()),
            estimated_delivery: Some(date(2023, 7, 22)),
        },
        Order {
            id: OrderId::new("ord-2"),
            user_id: UserId::new("user-1"),
            items: vec![OrderItem {
                product_id: ProductId::new("p5"),
                product_name: "Handcrafted Ceramic Dinnerware Set".to_string(),
                product_image: "https://images.unsplash.com/photo-1610701596061-2ecf227e85b2?auto=format&fit=crop&w=1000&q=80".to_string(),
                quantity: 1,
                price: Price::from_cents(18999),
            }],
            status: OrderStatus::Shipped,
            shipping_address: shipping_address.clone(),
            payment_method: "PayPal".to_string(),
            total_amount: Price::from_cents(18999),
            created_at: date(2023, 9, 1),
            updated_at: date(2023, 9, 3),
            tracking_number: Some("TRK987654321".to_string()),
            estimated_delivery: Some(date(2023, 9, 8)),
        },
        Order {
            id: OrderId::new("ord-3"),
            user_id: UserId::new("user-1"),
            items: vec![OrderItem {
                product_id: ProductId::new("p2"),
                product_name: "Ultra-Slim Laptop".to_string(),
                product_image: "https://images.unsplash.com/photo-1496181133206-80ce9b88a853?auto=format&fit=crop&w=1000&q=80".to_string(),
                quantity: 1,
                price: Price::from_cents(129_999),
            }],
            status: OrderStatus::Processing,
            shipping_address,
            payment_method: "Credit Card".to_string(),
            total_amount: Price::from_cents(129_999),
            created_at: date(2023, 10, 15),
            updated_at: date(2023, 10, 16),
            tracking_number: None,
            estimated_delivery: None,
        },
    ]
}
