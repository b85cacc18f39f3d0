//! Persistent cart store.
//!
//! The cart lives entirely on the client. It is a convenience cache only:
//! the store API re-validates price and availability when a product is
//! purchased. Every mutation writes the full cart to [`ClientStorage`]
//! before returning, so the durable slot always holds the latest state.
//!
//! # Invariants
//!
//! - At most one line per product.
//! - Quantities are never below 1; reaching 0 removes the line.
//! - Lines keep insertion order.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use folio_core::{Product, ProductId};

use crate::storage::{ClientStorage, StorageError};

/// Storage slot holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub quantity: u32,
}

impl CartLineItem {
    /// A new line for `product` with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            cover_image: product.cover_image.clone(),
            quantity: 1,
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The cart, bound to the storage slot it persists to.
pub struct CartStore {
    storage: Arc<dyn ClientStorage>,
    items: Vec<CartLineItem>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from `storage`.
    ///
    /// A missing slot, unreadable storage, invalid JSON, or a document that
    /// breaks the cart invariants all yield an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn ClientStorage>) -> Self {
        let items = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => parse_items(&raw).unwrap_or_else(|reason| {
                warn!(%reason, "Discarding persisted cart");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart");
                Vec::new()
            }
        };

        debug!(lines = items.len(), "Cart loaded");
        Self { storage, items }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Add one unit of `product`: bump the existing line or append a new one.
    pub fn add(&mut self, product: &Product) {
        match self.items.iter_mut().find(|item| item.product_id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartLineItem::from_product(product)),
        }
        self.persist();
    }

    /// Remove the line for `product_id`. No-op when absent.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
        self.persist();
    }

    /// Set the quantity of an existing line; `n <= 0` removes it.
    pub fn set_quantity(&mut self, product_id: ProductId, n: i64) {
        if n <= 0 {
            self.remove(product_id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|item| item.product_id == product_id) {
            item.quantity = u32::try_from(n).unwrap_or(u32::MAX);
        }
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Sum of `unit_price × quantity`; zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities (not the number of lines).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Write the cart to storage. Failures are logged; the in-memory cart
    /// stays authoritative for this process.
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    fn try_persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.items).map_err(|e| {
            StorageError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        self.storage.set(CART_STORAGE_KEY, &json)
    }
}

/// Parse a persisted cart, rejecting documents that break the invariants.
fn parse_items(raw: &str) -> Result<Vec<CartLineItem>, String> {
    let items: Vec<CartLineItem> = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if item.quantity == 0 {
            return Err(format!("product {} has quantity 0", item.product_id));
        }
        if item.unit_price.is_sign_negative() && !item.unit_price.is_zero() {
            return Err(format!("product {} has a negative price", item.product_id));
        }
        if !seen.insert(item.product_id) {
            return Err(format!("product {} appears twice", item.product_id));
        }
    }

    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use proptest::prelude::*;

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: None,
            price: Decimal::new(cents, 2),
            pdf_path: None,
            cover_image: None,
            active: true,
            created_at: None,
        }
    }

    fn empty_store() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let cart = CartStore::load(storage.clone());
        (storage, cart)
    }

    #[test]
    fn test_add_same_product_twice_merges() {
        let (_, mut cart) = empty_store();
        cart.add(&product(1, 1000));
        cart.add(&product(1, 1000));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let (_, mut cart) = empty_store();
        cart.add(&product(3, 100));
        cart.add(&product(1, 100));
        cart.add(&product(3, 100));

        let ids: Vec<i64> = cart.items().iter().map(|i| i.product_id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_total_then_remove_scenario() {
        let (_, mut cart) = empty_store();
        cart.add(&product(1, 1000));
        cart.set_quantity(ProductId::new(1), 2);
        assert_eq!(cart.total(), Decimal::new(2000, 2));

        cart.remove(ProductId::new(1));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let (_, mut cart) = empty_store();
        cart.add(&product(1, 500));
        cart.add(&product(2, 500));
        cart.set_quantity(ProductId::new(1), 0);

        assert!(cart.get(ProductId::new(1)).is_none());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_set_quantity_on_missing_item_is_noop() {
        let (_, mut cart) = empty_store();
        cart.add(&product(1, 500));
        cart.set_quantity(ProductId::new(9), 4);
        cart.remove(ProductId::new(9));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_every_mutation_persists() {
        let (storage, mut cart) = empty_store();
        cart.add(&product(1, 250));
        let reloaded = CartStore::load(storage.clone());
        assert_eq!(reloaded.items(), cart.items());

        cart.clear();
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let (storage, mut cart) = empty_store();
        let mut with_cover = product(7, 1999);
        with_cover.cover_image = Some("/covers/7.png".to_string());
        cart.add(&with_cover);
        cart.add(&product(2, 1));
        cart.set_quantity(ProductId::new(2), 5);

        let reloaded = CartStore::load(storage);
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total(), cart.total());
    }

    #[test]
    fn test_malformed_slot_yields_empty_cart() {
        for raw in [
            "not json",
            "{\"product_id\": 1}",
            r#"[{"product_id":1,"name":"a","unit_price":"1","quantity":0}]"#,
            r#"[{"product_id":1,"name":"a","unit_price":"1","quantity":1},
                {"product_id":1,"name":"a","unit_price":"1","quantity":2}]"#,
            r#"[{"product_id":1,"name":"a","unit_price":"-1","quantity":1}]"#,
        ] {
            let storage = Arc::new(MemoryStorage::with_slot(CART_STORAGE_KEY, raw));
            let cart = CartStore::load(storage);
            assert!(cart.is_empty(), "{raw}");
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64),
        Remove(i64),
        SetQuantity(i64, i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..6).prop_map(Op::Add),
            (1i64..6).prop_map(Op::Remove),
            ((1i64..6), (-2i64..8)).prop_map(|(id, n)| Op::SetQuantity(id, n)),
        ]
    }

    proptest! {
        #[test]
        fn prop_totals_match_independent_recomputation(ops in prop::collection::vec(op_strategy(), 0..40)) {
            let (storage, mut cart) = empty_store();
            for op in ops {
                match op {
                    Op::Add(id) => cart.add(&product(id, id * 125)),
                    Op::Remove(id) => cart.remove(ProductId::new(id)),
                    Op::SetQuantity(id, n) => cart.set_quantity(ProductId::new(id), n),
                }
            }

            let mut expected_count = 0u64;
            let mut expected_total = Decimal::ZERO;
            let mut ids = HashSet::new();
            for item in cart.items() {
                prop_assert!(item.quantity >= 1);
                prop_assert!(ids.insert(item.product_id));
                expected_count += u64::from(item.quantity);
                expected_total += item.unit_price * Decimal::from(item.quantity);
            }
            prop_assert_eq!(cart.item_count(), expected_count);
            prop_assert_eq!(cart.total(), expected_total);

            let reloaded = CartStore::load(storage);
            prop_assert_eq!(reloaded.items(), cart.items());
        }
    }
}
