//! Orders, baskets, and line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use orderhub_core::{ContactId, ListingId, OrderId, OrderItemId, OrderState, UserId};

use super::contact::Contact;

/// An order row. A `basket`-state order is the owner's open basket; there
/// is at most one per user (enforced by a partial unique index).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub state: OrderState,
    pub contact_id: Option<ContactId>,
    /// Cached basket total, recomputed best-effort on every basket mutation.
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One (listing, quantity) pair attached to an order.
///
/// Unique per `(order_id, listing_id)`: adding an already-present listing
/// increments the quantity instead of duplicating the row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub listing_id: ListingId,
    pub quantity: i32,
}

/// A basket line item with listing details resolved for display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BasketItem {
    pub id: OrderItemId,
    pub listing_id: ListingId,
    pub product: String,
    pub shop: String,
    pub quantity: i32,
    pub price: Decimal,
    /// Live stock on the listing at read time.
    pub available: i32,
}

impl BasketItem {
    /// Price of this line: `quantity × unit price`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }

    /// Whether the requested quantity is still covered by live stock.
    ///
    /// Basket contents are advisory; stock can drain between adding an item
    /// and placing the order, so this flag is recomputed on every read.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.quantity <= self.available
    }
}

/// The basket as returned to the owner. When no basket row exists the API
/// returns this shape with `id: null` and an empty item list rather than a
/// not-found error.
#[derive(Debug, Clone, Serialize)]
pub struct BasketView {
    pub id: Option<OrderId>,
    pub state: OrderState,
    pub items: Vec<BasketItem>,
    pub total: Decimal,
}

impl BasketView {
    /// The explicit empty-basket shape.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            id: None,
            state: OrderState::Basket,
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}

/// A placed order with items and contact embedded, as returned by order
/// listings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub items: Vec<BasketItem>,
    pub total: Decimal,
    pub contact: Option<Contact>,
}

/// Sum of `quantity × price` over basket items.
#[must_use]
pub fn basket_total(items: &[BasketItem]) -> Decimal {
    items.iter().map(BasketItem::line_total).sum()
}

/// One basket line joined with the live stock of its listing, as read
/// under a row lock during placement.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlacementLine {
    pub listing_id: ListingId,
    pub product: String,
    pub requested: i32,
    pub available: i32,
}

/// A line item whose requested quantity exceeds live stock, reported to the
/// caller on failed placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortage {
    pub product: String,
    pub requested: i32,
    pub available: i32,
}

/// Collect every line whose requested quantity exceeds availability.
///
/// Placement is all-or-nothing: if this returns a non-empty list, nothing
/// is decremented and the full list goes back to the caller, not just the
/// first offender.
#[must_use]
pub fn collect_shortages(lines: &[PlacementLine]) -> Vec<StockShortage> {
    lines
        .iter()
        .filter(|line| line.requested > line.available)
        .map(|line| StockShortage {
            product: line.product.clone(),
            requested: line.requested,
            available: line.available,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    fn item(quantity: i32, price: &str, available: i32) -> BasketItem {
        BasketItem {
            id: orderhub_core::OrderItemId::new(1),
            listing_id: ListingId::new(1),
            product: "Widget".to_owned(),
            shop: "Acme".to_owned(),
            quantity,
            price: price.parse().expect("price"),
            available,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(3, "19.99", 10).line_total(), dec("59.97"));
    }

    #[test]
    fn test_basket_total_sums_lines() {
        let items = vec![item(3, "19.99", 10), item(2, "5.00", 10)];
        assert_eq!(basket_total(&items), dec("69.97"));
    }

    #[test]
    fn test_basket_total_empty() {
        assert_eq!(basket_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_availability_flag() {
        assert!(item(5, "1.00", 5).is_available());
        assert!(!item(7, "1.00", 5).is_available());
    }

    fn line(product: &str, requested: i32, available: i32) -> PlacementLine {
        PlacementLine {
            listing_id: ListingId::new(1),
            product: product.to_owned(),
            requested,
            available,
        }
    }

    #[test]
    fn test_collect_shortages_empty_when_stock_suffices() {
        let lines = vec![line("a", 3, 10), line("b", 10, 10)];
        assert!(collect_shortages(&lines).is_empty());
    }

    #[test]
    fn test_collect_shortages_reports_every_offender() {
        let lines = vec![line("a", 11, 10), line("b", 2, 5), line("c", 6, 0)];
        let shortages = collect_shortages(&lines);
        assert_eq!(shortages.len(), 2);
        assert_eq!(
            shortages.first(),
            Some(&StockShortage {
                product: "a".to_owned(),
                requested: 11,
                available: 10,
            })
        );
        assert_eq!(
            shortages.last(),
            Some(&StockShortage {
                product: "c".to_owned(),
                requested: 6,
                available: 0,
            })
        );
    }

    #[test]
    fn test_empty_basket_view_shape() {
        let view = BasketView::empty();
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["id"], serde_json::Value::Null);
        assert_eq!(json["state"], "basket");
        assert_eq!(json["items"].as_array().map(Vec::len), Some(0));
    }
}
