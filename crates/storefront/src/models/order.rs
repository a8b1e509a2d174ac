//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tafe_shop_core::{OrderId, OrderStatus, Price, Username};

use super::cart::{CartLineItem, SHIPPING_FLAT_CENTS, TAX_RATE};

/// Recorded money breakdown of an order.
///
/// Each line total is rounded to cents before summing, so the subtotal can
/// differ from the cart total rounded once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Compute the totals recorded for a cart.
    #[must_use]
    pub fn for_items(items: &[CartLineItem]) -> Self {
        let subtotal: Price = items
            .iter()
            .map(|item| item.line_total().rounded())
            .sum();
        let tax = Price::new(subtotal.amount() * TAX_RATE).rounded();
        let shipping = Price::from_cents(SHIPPING_FLAT_CENTS);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// A placed order. Never mutated after creation.
///
/// Money fields are decimal strings with exactly two places, as the browser
/// storefront recorded them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: Username,
    pub date: DateTime<Utc>,
    pub items: Vec<CartLineItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    /// Build an order from a snapshot of the cart.
    #[must_use]
    pub fn new(id: OrderId, user_id: Username, date: DateTime<Utc>, items: Vec<CartLineItem>) -> Self {
        let totals = OrderTotals::for_items(&items);
        Self {
            id,
            user_id,
            date,
            items,
            subtotal: totals.subtotal.rounded().amount(),
            shipping: totals.shipping.rounded().amount(),
            tax: totals.tax.rounded().amount(),
            total: totals.total.rounded().amount(),
            status: OrderStatus::Processing,
        }
    }

    /// The recorded totals.
    #[must_use]
    pub const fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: Price::new(self.subtotal),
            shipping: Price::new(self.shipping),
            tax: Price::new(self.tax),
            total: Price::new(self.total),
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tafe_shop_core::CatalogItemId;

    use super::*;

    fn line(id: i64, price: Decimal, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: CatalogItemId::new(id),
            name: format!("Item {id}"),
            price,
            image: String::new(),
            alt: String::new(),
            description: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_totals_reference_cart() {
        let totals = OrderTotals::for_items(&[
            line(1, Decimal::new(1999, 2), 2),
            line(2, Decimal::new(500, 2), 1),
        ]);
        assert_eq!(totals.subtotal, Price::from_cents(4498));
        assert_eq!(totals.tax, Price::from_cents(450));
        assert_eq!(totals.shipping, Price::from_cents(1000));
        assert_eq!(totals.total, Price::from_cents(5948));
    }

    #[test]
    fn test_subtotal_rounds_each_line() {
        // 0.333 * 3 = 0.999 -> 1.00 per line, two lines -> 2.00
        let totals = OrderTotals::for_items(&[
            line(1, Decimal::new(333, 3), 3),
            line(2, Decimal::new(333, 3), 3),
        ]);
        assert_eq!(totals.subtotal, Price::from_cents(200));
    }

    #[test]
    fn test_wire_format() {
        let date = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let order = Order::new(
            OrderId::from_millis(1),
            Username::parse("alice").unwrap(),
            date,
            vec![line(1, Decimal::new(1999, 2), 2), line(2, Decimal::new(5, 0), 1)],
        );

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["id"], "order_1");
        assert_eq!(json["userId"], "alice");
        assert_eq!(json["subtotal"], "44.98");
        assert_eq!(json["shipping"], "10.00");
        assert_eq!(json["tax"], "4.50");
        assert_eq!(json["total"], "59.48");
        assert_eq!(json["status"], "processing");

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
        assert_eq!(back.unit_count(), 3);
    }
}
