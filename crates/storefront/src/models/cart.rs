//! Cart domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tafe_shop_core::{CatalogItemId, Price};

use crate::catalog::CatalogEntry;

/// Flat shipping charge applied to every order.
pub const SHIPPING_FLAT_CENTS: i64 = 1000;

/// Tax rate applied to the subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// One entry of the cart.
///
/// Display fields are copied from the catalog when the entry is first added
/// and are not refreshed if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: CatalogItemId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub description: String,
    /// Always at least 1 while stored.
    pub quantity: u32,
}

impl CartLineItem {
    /// A new line with quantity 1, copied from a catalog entry.
    #[must_use]
    pub fn from_entry(entry: &CatalogEntry<'_>) -> Self {
        Self {
            id: entry.id(),
            name: entry.name().to_string(),
            price: entry.price().amount(),
            image: entry.image().to_string(),
            alt: entry.name().to_string(),
            description: entry.description().to_string(),
            quantity: 1,
        }
    }

    /// `price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::new(self.price * Decimal::from(self.quantity))
    }
}

/// Order summary shown beside the cart.
///
/// Every figure is exact; rounding happens only when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Number of distinct lines (not units).
    pub line_count: usize,
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl CartSummary {
    /// Summarize a cart.
    #[must_use]
    pub fn of(cart: &[CartLineItem]) -> Self {
        let subtotal: Price = cart.iter().map(CartLineItem::line_total).sum();
        let shipping = Price::from_cents(SHIPPING_FLAT_CENTS);
        let tax = Price::new(subtotal.amount() * TAX_RATE);
        Self {
            line_count: cart.len(),
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i64, cents: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: CatalogItemId::new(id),
            name: format!("Item {id}"),
            price: Decimal::new(cents, 2),
            image: String::new(),
            alt: String::new(),
            description: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_tax_rate_is_ten_percent() {
        assert_eq!(TAX_RATE, Decimal::new(1, 1));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(1, 1999, 2).line_total(), Price::from_cents(3998));
    }

    #[test]
    fn test_summary_is_unrounded() {
        let summary = CartSummary::of(&[line(1, 1999, 2), line(2, 500, 1)]);
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.subtotal, Price::from_cents(4498));
        assert_eq!(summary.tax.amount(), Decimal::new(4498, 3));
        assert_eq!(summary.shipping, Price::from_cents(1000));
        assert_eq!(summary.total.amount(), Decimal::new(59478, 3));
        assert_eq!(summary.total.display(), "$59.48");
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::of(&[]);
        assert_eq!(summary.subtotal, Price::ZERO);
        assert_eq!(summary.total, Price::from_cents(1000));
    }

    #[test]
    fn test_price_stored_as_number() {
        let json = serde_json::to_value(line(3, 1999, 1)).unwrap();
        assert_eq!(json["price"], serde_json::json!(19.99));
        assert_eq!(json["id"], serde_json::json!(3));
    }
}
