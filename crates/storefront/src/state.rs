//! Application state shared across the UI layer.
//!
//! The stores are wired here explicitly - there are no ambient singletons.
//! The embedding application builds one `AppState` at startup (rehydrating
//! persisted cart and session state before anything renders) and passes it
//! down to whatever drives it.

use std::sync::Arc;

use tidepool_core::UserId;

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::config::StoreConfig;
use crate::models::{Address, Order};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::orders::OrderStore;
use crate::persist::PersistenceBridge;
use crate::pricing::{self, CheckoutSummary};
use crate::session::SessionStore;
use crate::storage::{MemoryStorage, Storage};

/// User id recorded on orders placed without signing in.
const GUEST_USER_ID: &str = "guest";

/// Application state shared across the whole client session.
///
/// Cheaply cloneable via `Arc`; all stores are behind interior locks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    catalog: Catalog,
    cart: CartStore,
    session: SessionStore,
    orders: OrderStore,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Build the application state and rehydrate persisted store state.
    ///
    /// Both the cart and the session are restored from `storage` before this
    /// returns, so the first render already sees them.
    #[must_use]
    pub fn new(
        config: StoreConfig,
        storage: Arc<dyn Storage>,
        catalog: Catalog,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let bridge = Arc::new(PersistenceBridge::new(storage));
        let cart = CartStore::restore(Arc::clone(&bridge), Arc::clone(&notifier));
        let session = SessionStore::restore(
            Arc::clone(&bridge),
            Arc::clone(&notifier),
            config.simulated_latency,
        );
        let orders = OrderStore::restore(bridge);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
                session,
                orders,
                notifier,
            }),
        }
    }

    /// In-memory demo wiring: demo catalog, ephemeral storage, notifications
    /// routed to `tracing`.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(
            StoreConfig::default(),
            Arc::new(MemoryStorage::new()),
            Catalog::demo(),
            Arc::new(TracingNotifier),
        )
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the order history store.
    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.inner.orders
    }

    /// Totals for the current cart, for cart-display and checkout.
    #[must_use]
    pub fn checkout_summary(&self) -> CheckoutSummary {
        pricing::summarize(&self.inner.cart.snapshot(), &self.inner.config.pricing)
    }

    /// Place an order for the current cart.
    ///
    /// Returns `None` without side effects when the cart is empty. Otherwise
    /// simulates order processing, records the order (for the signed-in user,
    /// or the guest id), clears the cart, and confirms with a notification.
    pub async fn checkout(
        &self,
        shipping_address: Address,
        payment_method: impl Into<String>,
    ) -> Option<Order> {
        let snapshot = self.inner.cart.snapshot();
        if snapshot.is_empty() {
            return None;
        }

        tokio::time::sleep(self.inner.config.checkout_latency).await;

        let summary = pricing::summarize(&snapshot, &self.inner.config.pricing);
        let user_id = self
            .inner
            .session
            .current_user()
            .map_or_else(|| UserId::new(GUEST_USER_ID), |user| user.id);

        let order = self.inner.orders.create_order(
            user_id,
            &snapshot,
            shipping_address,
            payment_method,
            &summary,
        );

        self.inner.cart.clear();
        self.inner.notifier.notify(Notification::new(
            "Order placed successfully!",
            format!("Order {} is confirmed.", order.id),
        ));

        Some(order)
    }
}
