//! Local cart inspection.

use std::sync::Arc;

use folio_storefront::cart::{CART_STORAGE_KEY, CartStore};
use folio_storefront::config::StorefrontConfig;
use folio_storefront::storage::{ClientStorage, FileStorage};

use super::CommandError;

fn open(storage: &FileStorage) -> CartStore {
    CartStore::load(Arc::new(storage.clone()))
}

/// Log every cart line and the totals.
pub fn show(config: &StorefrontConfig) {
    let storage = FileStorage::new(config.data_dir.clone());
    let cart = open(&storage);
    if cart.is_empty() {
        tracing::info!("Cart in {} is empty", storage.dir().display());
        return;
    }

    for item in cart.items() {
        tracing::info!(
            "#{} {} x{} @ {} = {}",
            item.product_id,
            item.name,
            item.quantity,
            config.currency.format(item.unit_price),
            config.currency.format(item.line_total())
        );
    }
    tracing::info!(
        "{} item(s), total {}",
        cart.item_count(),
        config.currency.format(cart.total())
    );
}

/// Delete the persisted cart slot. The storefront starts from an empty cart
/// the next time it loads.
pub fn clear(config: &StorefrontConfig) -> Result<(), CommandError> {
    let storage = FileStorage::new(config.data_dir.clone());
    clear_slot(&storage)
}

fn clear_slot(storage: &FileStorage) -> Result<(), CommandError> {
    let lines = open(storage).items().len();
    storage.remove(CART_STORAGE_KEY)?;
    tracing::info!(
        "Removed {lines} line(s) from the cart in {}",
        storage.dir().display()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_removes_slot_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage
            .set(
                CART_STORAGE_KEY,
                r#"[{"product_id":1,"name":"Rust Guide","unit_price":"29.90","quantity":2}]"#,
            )
            .unwrap();
        assert_eq!(open(&storage).item_count(), 2);

        clear_slot(&storage).unwrap();

        assert!(!dir.path().join("cart.json").exists());
        assert!(storage.get(CART_STORAGE_KEY).unwrap().is_none());
        assert!(open(&storage).is_empty());
    }

    #[test]
    fn test_clear_without_slot_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("missing"));
        clear_slot(&storage).unwrap();
    }
}
