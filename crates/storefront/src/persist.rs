//! Persistence bridge: durable mirror of cart, session, and order state.
//!
//! The bridge owns the persisted record schema. Every record carries an
//! explicit `version` field; a record whose version or shape is not
//! recognized is discarded as if absent rather than trusted into the live
//! stores.
//!
//! # Contract
//!
//! - Loads never fail past this boundary: parse, shape, version, and I/O
//!   faults are logged and downgraded to "treat as absent".
//! - Saves serialize the full current snapshot (never a diff), synchronously,
//!   last-write-wins. Write faults are logged and swallowed; the in-memory
//!   store stays authoritative.
//! - Rehydrated cart lines are re-validated: zero quantities are dropped and
//!   duplicate product ids are collapsed, so persisted state always satisfies
//!   the same invariants as in-memory state.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{CartLine, Order, UserProfile};
use crate::storage::Storage;

/// Current persisted-record schema version.
const SCHEMA_VERSION: u32 = 1;

/// Storage keys for persisted records.
pub mod keys {
    /// Key for the cart line sequence.
    pub const CART: &str = "cart";

    /// Key for the authenticated user's profile.
    pub const SESSION_USER: &str = "user";

    /// Key for orders placed in this client context.
    pub const ORDERS: &str = "orders";
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCart {
    version: u32,
    lines: Vec<CartLine>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedOrders {
    version: u32,
    orders: Vec<Order>,
}

/// Serializes store state into a [`Storage`] backend and rehydrates it on
/// load.
pub struct PersistenceBridge {
    storage: Arc<dyn Storage>,
}

impl PersistenceBridge {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Load the persisted cart, or an empty one.
    ///
    /// Malformed or unrecognized records yield an empty cart; rehydrated
    /// lines are sanitized against cart invariants.
    #[must_use]
    pub fn load_cart(&self) -> Vec<CartLine> {
        let Some(record) = self.load_record::<PersistedCart>(keys::CART) else {
            return Vec::new();
        };
        if record.version != SCHEMA_VERSION {
            tracing::warn!(
                version = record.version,
                "discarding cart record with unknown schema version"
            );
            return Vec::new();
        }
        sanitize_lines(record.lines)
    }

    /// Persist the full cart line sequence.
    pub fn save_cart(&self, lines: &[CartLine]) {
        self.store_record(
            keys::CART,
            &PersistedCart {
                version: SCHEMA_VERSION,
                lines: lines.to_vec(),
            },
        );
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Load the persisted user profile, if a valid one exists.
    ///
    /// A corrupt record is deleted so it cannot shadow future sessions.
    #[must_use]
    pub fn load_user(&self) -> Option<UserProfile> {
        let raw = match self.storage.get(keys::SESSION_USER) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = keys::SESSION_USER, error = %e, "failed to read persisted session");
                return None;
            }
        };

        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(record) if record.version == SCHEMA_VERSION => Some(record.user),
            Ok(record) => {
                tracing::warn!(
                    version = record.version,
                    "discarding session record with unknown schema version"
                );
                self.delete_user();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse stored user data, logging out");
                self.delete_user();
                None
            }
        }
    }

    /// Persist the full user profile.
    pub fn save_user(&self, user: &UserProfile) {
        self.store_record(
            keys::SESSION_USER,
            &PersistedSession {
                version: SCHEMA_VERSION,
                user: user.clone(),
            },
        );
    }

    /// Delete the persisted user profile (logout).
    pub fn delete_user(&self) {
        if let Err(e) = self.storage.remove(keys::SESSION_USER) {
            tracing::error!(key = keys::SESSION_USER, error = %e, "failed to delete persisted session");
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Load orders placed in this client context.
    #[must_use]
    pub fn load_orders(&self) -> Vec<Order> {
        let Some(record) = self.load_record::<PersistedOrders>(keys::ORDERS) else {
            return Vec::new();
        };
        if record.version != SCHEMA_VERSION {
            tracing::warn!(
                version = record.version,
                "discarding orders record with unknown schema version"
            );
            return Vec::new();
        }
        record.orders
    }

    /// Persist the full set of locally placed orders.
    pub fn save_orders(&self, orders: &[Order]) {
        self.store_record(
            keys::ORDERS,
            &PersistedOrders {
                version: SCHEMA_VERSION,
                orders: orders.to_vec(),
            },
        );
    }

    // =========================================================================
    // Record plumbing
    // =========================================================================

    fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted record");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding malformed persisted record");
                None
            }
        }
    }

    fn store_record<T: Serialize>(&self, key: &str, record: &T) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to serialize record");
                return;
            }
        };
        if let Err(e) = self.storage.put(key, &json) {
            tracing::error!(key, error = %e, "failed to persist record");
        }
    }
}

/// Enforce cart invariants on rehydrated lines: drop non-positive quantities
/// and collapse duplicate product ids (quantities merge into the first
/// occurrence, preserving its position).
fn sanitize_lines(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut sanitized: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            tracing::warn!(product_id = %line.product.id, "dropping rehydrated cart line with zero quantity");
            continue;
        }
        if let Some(existing) = sanitized
            .iter_mut()
            .find(|l| l.product.id == line.product.id)
        {
            tracing::warn!(product_id = %line.product.id, "collapsing duplicate rehydrated cart line");
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            sanitized.push(line);
        }
    }
    sanitized
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::MemoryStorage;

    fn bridge() -> PersistenceBridge {
        PersistenceBridge::new(Arc::new(MemoryStorage::new()))
    }

    fn line(product_index: usize, quantity: u32) -> CartLine {
        let catalog = Catalog::demo();
        CartLine {
            product: catalog.products()[product_index].clone(),
            quantity,
        }
    }

    #[test]
    fn test_cart_round_trip() {
        let bridge = bridge();
        let lines = vec![line(0, 2), line(1, 1)];
        bridge.save_cart(&lines);
        assert_eq!(bridge.load_cart(), lines);
    }

    #[test]
    fn test_absent_cart_is_empty() {
        assert!(bridge().load_cart().is_empty());
    }

    #[test]
    fn test_malformed_cart_is_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put(keys::CART, "{not json").unwrap();
        let bridge = PersistenceBridge::new(storage);
        assert!(bridge.load_cart().is_empty());
    }

    #[test]
    fn test_unknown_cart_version_is_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .put(keys::CART, r#"{"version":99,"lines":[]}"#)
            .unwrap();
        let bridge = PersistenceBridge::new(storage);
        assert!(bridge.load_cart().is_empty());
    }

    #[test]
    fn test_rehydration_sanitizes_invalid_lines() {
        let bridge = bridge();
        // A record that was well-formed JSON but violates cart invariants:
        // duplicate ids and a zero quantity.
        bridge.save_cart(&[line(0, 2), line(1, 0), line(0, 3)]);

        let loaded = bridge.load_cart();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].quantity, 5);
    }

    #[test]
    fn test_user_round_trip_and_delete() {
        let bridge = bridge();
        assert!(bridge.load_user().is_none());

        let user = crate::session::demo_profile(tidepool_core::Email::parse("a@b.c").unwrap());
        bridge.save_user(&user);
        assert_eq!(bridge.load_user().unwrap().email.as_str(), "a@b.c");

        bridge.delete_user();
        assert!(bridge.load_user().is_none());
    }

    #[test]
    fn test_corrupt_user_record_is_deleted() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put(keys::SESSION_USER, "corrupt").unwrap();
        let bridge = PersistenceBridge::new(Arc::clone(&storage) as Arc<dyn Storage>);

        assert!(bridge.load_user().is_none());
        // The bad record must not survive to shadow the next load.
        assert!(storage.get(keys::SESSION_USER).unwrap().is_none());
    }
}
