//! Cart service.
//!
//! The cart is a single list of line items stored under one key and
//! rewritten wholesale on every mutation. It belongs to the browser profile
//! (the persistent store), not to the logged-in user.

use std::sync::Arc;

use tracing::instrument;

use tafe_shop_core::{CatalogItemId, Price};

use crate::catalog::Catalog;
use crate::models::{CartLineItem, CartSummary};
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Cart manager.
///
/// Cheap to clone; clones share the same store and catalog.
#[derive(Clone)]
pub struct CartManager {
    local: Arc<dyn KeyValueStore>,
    catalog: Arc<Catalog>,
}

impl CartManager {
    /// Create a manager over the persistent store and the session's catalog.
    #[must_use]
    pub fn new(local: Arc<dyn KeyValueStore>, catalog: Arc<Catalog>) -> Self {
        Self { local, catalog }
    }

    /// Create the empty cart if none is stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn initialize(&self) -> Result<(), StorageError> {
        storage::init_json(self.local.as_ref(), keys::CART, &Vec::<CartLineItem>::new())
    }

    /// The stored line items. Absent or unparsable data reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn get_cart(&self) -> Result<Vec<CartLineItem>, StorageError> {
        storage::read_json_or_default(self.local.as_ref(), keys::CART)
    }

    /// Add one unit of a catalog entry.
    ///
    /// Returns the updated line, or `None` if no product or course has this
    /// ID (the cart is left untouched).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    #[instrument(skip(self))]
    pub fn add_to_cart(&self, item_id: CatalogItemId) -> Result<Option<CartLineItem>, StorageError> {
        let Some(entry) = self.catalog.find(item_id) else {
            tracing::debug!(%item_id, "Add to cart ignored, item not in catalog");
            return Ok(None);
        };

        let mut cart = self.get_cart()?;
        let line = if let Some(existing) = cart.iter_mut().find(|line| line.id == item_id) {
            existing.quantity = existing.quantity.saturating_add(1);
            existing.clone()
        } else {
            let line = CartLineItem::from_entry(&entry);
            cart.push(line.clone());
            line
        };

        self.save(&cart)?;
        tracing::info!(%item_id, quantity = line.quantity, "Item added to cart");
        Ok(Some(line))
    }

    /// Set a line's quantity. Anything below 1 removes the line.
    ///
    /// Unknown IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    #[instrument(skip(self))]
    pub fn update_cart_item(&self, item_id: CatalogItemId, quantity: i64) -> Result<(), StorageError> {
        if quantity < 1 {
            return self.remove_cart_item(item_id);
        }
        self.set_quantity(item_id, u32::try_from(quantity).unwrap_or(u32::MAX))
    }

    /// Remove a line if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    #[instrument(skip(self))]
    pub fn remove_cart_item(&self, item_id: CatalogItemId) -> Result<(), StorageError> {
        let mut cart = self.get_cart()?;
        cart.retain(|line| line.id != item_id);
        self.save(&cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) -> Result<(), StorageError> {
        self.save(&[])
    }

    /// Total units across all lines.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn get_cart_item_count(&self) -> Result<u64, StorageError> {
        Ok(self
            .get_cart()?
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum())
    }

    /// Sum of `price × quantity`, unrounded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn get_cart_total(&self) -> Result<Price, StorageError> {
        Ok(self.get_cart()?.iter().map(CartLineItem::line_total).sum())
    }

    /// Summary for the cart page.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn summary(&self) -> Result<CartSummary, StorageError> {
        Ok(CartSummary::of(&self.get_cart()?))
    }

    /// The catalog this cart resolves IDs against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn set_quantity(&self, item_id: CatalogItemId, quantity: u32) -> Result<(), StorageError> {
        let mut cart = self.get_cart()?;
        let Some(line) = cart.iter_mut().find(|line| line.id == item_id) else {
            return Ok(());
        };
        line.quantity = quantity;
        self.save(&cart)
    }

    fn save(&self, cart: &[CartLineItem]) -> Result<(), StorageError> {
        storage::write_json(self.local.as_ref(), keys::CART, cart)
    }
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager").finish_non_exhaustive()
    }
}

/// Parse the quantity typed into the "Update" prompt.
///
/// Returns `None` for input that is not a whole number, in which case the
/// cart should be left unchanged.
#[must_use]
pub fn parse_quantity_input(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::Product;
    use crate::storage::MemoryStore;

    fn catalog() -> Arc<Catalog> {
        let products = vec![
            Product {
                id: CatalogItemId::new(1),
                name: "Workbook".to_string(),
                price: Decimal::new(1999, 2),
                image: "wb.png".to_string(),
                description: "Printed".to_string(),
            },
            Product {
                id: CatalogItemId::new(2),
                name: "Toolkit".to_string(),
                price: Decimal::new(500, 2),
                image: "tk.png".to_string(),
                description: "Tools".to_string(),
            },
        ];
        Arc::new(Catalog::new(products, Vec::new()))
    }

    fn manager() -> (CartManager, Arc<MemoryStore>) {
        let local = Arc::new(MemoryStore::new());
        (CartManager::new(local.clone(), catalog()), local)
    }

    #[test]
    fn test_add_copies_display_fields() {
        let (cart, _) = manager();
        let line = cart.add_to_cart(CatalogItemId::new(1)).unwrap().unwrap();
        assert_eq!(line.name, "Workbook");
        assert_eq!(line.alt, "Workbook");
        assert_eq!(line.image, "wb.png");
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_add_unknown_is_none() {
        let (cart, local) = manager();
        assert!(cart.add_to_cart(CatalogItemId::new(99)).unwrap().is_none());
        assert_eq!(local.get(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_update_sets_exact_quantity() {
        let (cart, _) = manager();
        cart.add_to_cart(CatalogItemId::new(1)).unwrap();
        cart.update_cart_item(CatalogItemId::new(1), 7).unwrap();
        assert_eq!(cart.get_cart().unwrap()[0].quantity, 7);
    }

    #[test]
    fn test_update_below_one_removes() {
        let (cart, _) = manager();
        cart.add_to_cart(CatalogItemId::new(1)).unwrap();
        cart.update_cart_item(CatalogItemId::new(1), -3).unwrap();
        assert!(cart.get_cart().unwrap().is_empty());
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let (cart, _) = manager();
        cart.add_to_cart(CatalogItemId::new(1)).unwrap();
        cart.update_cart_item(CatalogItemId::new(2), 5).unwrap();
        assert_eq!(cart.get_cart().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_cart_reads_empty() {
        let (cart, local) = manager();
        local.set(keys::CART, "[{broken").unwrap();
        assert!(cart.get_cart().unwrap().is_empty());
        assert_eq!(cart.get_cart_item_count().unwrap(), 0);
    }

    #[test]
    fn test_count_and_total() {
        let (cart, _) = manager();
        cart.add_to_cart(CatalogItemId::new(1)).unwrap();
        cart.add_to_cart(CatalogItemId::new(1)).unwrap();
        cart.add_to_cart(CatalogItemId::new(2)).unwrap();
        assert_eq!(cart.get_cart_item_count().unwrap(), 3);
        assert_eq!(cart.get_cart_total().unwrap(), Price::from_cents(4498));
    }

    #[test]
    fn test_initialize_keeps_existing_cart() {
        let (cart, _) = manager();
        cart.add_to_cart(CatalogItemId::new(2)).unwrap();
        cart.initialize().unwrap();
        assert_eq!(cart.get_cart().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_quantity_input() {
        assert_eq!(parse_quantity_input(" 4 "), Some(4));
        assert_eq!(parse_quantity_input("0"), Some(0));
        assert_eq!(parse_quantity_input("four"), None);
        assert_eq!(parse_quantity_input(""), None);
    }
}
