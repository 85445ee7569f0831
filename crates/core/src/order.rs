//! Orders and order drafting.
//!
//! An order is an immutable snapshot of a cart at checkout: every
//! [`OrderItem`] carries the name and unit price the product had at that
//! moment. Later catalog edits never change a placed order. Only the status
//! moves after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartItem, MAX_LINE_QUANTITY, cart_total};
use crate::types::{OrderId, OrderStatus, ProductId, UserId};
use crate::user::User;

/// Account that placed an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOwner {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for OrderOwner {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// One purchased line, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: OrderOwner,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Whether `user` may view this order (its owner or an administrator).
    #[must_use]
    pub fn is_visible_to(&self, user: &User) -> bool {
        user.is_admin() || self.owner.id == user.id
    }

    /// Sum of all item quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Largest order total storage accepts (999,999,999,999.99).
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

/// Reasons a cart cannot be turned into an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderDraftError {
    #[error("cannot create an order without items")]
    Empty,
    #[error("item for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
    #[error("item for product {0} exceeds the maximum quantity of {MAX_LINE_QUANTITY}")]
    QuantityTooLarge(ProductId),
    #[error("order total {0} exceeds the maximum of {MAX_ORDER_TOTAL}")]
    TotalTooLarge(Decimal),
}

/// An order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub owner: OrderOwner,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    /// Draft a pending order from resolved cart items.
    ///
    /// Each item's unit price is copied from the product as given, and the
    /// total is the same [`cart_total`] the cart page shows.
    ///
    /// # Errors
    ///
    /// Returns `OrderDraftError` if `items` is empty, a quantity is zero or
    /// above [`MAX_LINE_QUANTITY`], or the total is above [`MAX_ORDER_TOTAL`].
    pub fn from_cart(
        owner: impl Into<OrderOwner>,
        items: &[CartItem],
        now: DateTime<Utc>,
    ) -> Result<Self, OrderDraftError> {
        if items.is_empty() {
            return Err(OrderDraftError::Empty);
        }
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(OrderDraftError::ZeroQuantity(item.product.id));
        }
        if let Some(item) = items.iter().find(|item| item.quantity > MAX_LINE_QUANTITY) {
            return Err(OrderDraftError::QuantityTooLarge(item.product.id));
        }
        let total = cart_total(items);
        if total > MAX_ORDER_TOTAL {
            return Err(OrderDraftError::TotalTooLarge(total));
        }

        let order_items = items
            .iter()
            .map(|item| OrderItem {
                product_id: Some(item.product.id),
                product_name: item.product.name.clone(),
                quantity: item.quantity,
                unit_price: item.product.price,
            })
            .collect();

        Ok(Self {
            owner: owner.into(),
            created_at: now,
            status: OrderStatus::pending(),
            total,
            items: order_items,
        })
    }

    /// Attach the identifier assigned by storage.
    #[must_use]
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            owner: self.owner,
            created_at: self.created_at,
            status: self.status,
            total: self.total,
            items: self.items,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::product::Product;
    use crate::types::Role;

    fn shopper() -> User {
        User {
            id: UserId::new(5),
            username: "user".to_owned(),
            role: Role::User,
        }
    }

    fn item(id: i32, name: &str, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            product: Product {
                id: ProductId::new(id),
                name: name.to_owned(),
                description: String::new(),
                price,
                image_url: String::new(),
            },
            quantity,
        }
    }

    #[test]
    fn test_draft_snapshots_prices_and_totals() {
        let items = vec![
            item(1, "Cable", Decimal::new(10, 0), 2),
            item(2, "Adapter", Decimal::new(5, 0), 1),
        ];

        let draft = NewOrder::from_cart(&shopper(), &items, Utc::now()).unwrap();

        assert_eq!(draft.total, Decimal::new(25, 0));
        assert!(draft.status.is_pending());
        assert_eq!(draft.owner.username, "user");
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].unit_price, Decimal::new(10, 0));
        assert_eq!(draft.items[0].product_name, "Cable");
        assert_eq!(draft.items[1].product_id, Some(ProductId::new(2)));
    }

    #[test]
    fn test_draft_total_equals_sum_of_line_totals() {
        let items = vec![
            item(1, "A", Decimal::new(1010, 2), 3),
            item(2, "B", Decimal::new(99, 2), 7),
        ];

        let draft = NewOrder::from_cart(&shopper(), &items, Utc::now()).unwrap();
        let summed: Decimal = draft.items.iter().map(OrderItem::line_total).sum();

        assert_eq!(draft.total, summed);
    }

    #[test]
    fn test_draft_is_unaffected_by_later_price_changes() {
        let mut items = vec![item(1, "Cable", Decimal::new(10, 0), 1)];
        let draft = NewOrder::from_cart(&shopper(), &items, Utc::now()).unwrap();

        items[0].product.price = Decimal::new(99, 0);

        assert_eq!(draft.items[0].unit_price, Decimal::new(10, 0));
        assert_eq!(draft.total, Decimal::new(10, 0));
    }

    #[test]
    fn test_empty_cart_cannot_be_drafted() {
        assert_eq!(
            NewOrder::from_cart(&shopper(), &[], Utc::now()),
            Err(OrderDraftError::Empty)
        );
    }

    #[test]
    fn test_zero_quantity_item_is_rejected() {
        let items = vec![item(3, "Broken", Decimal::ONE, 0)];
        assert_eq!(
            NewOrder::from_cart(&shopper(), &items, Utc::now()),
            Err(OrderDraftError::ZeroQuantity(ProductId::new(3)))
        );
    }

    #[test]
    fn test_quantity_above_line_maximum_is_rejected() {
        let items = vec![item(4, "Bulk", Decimal::ONE, MAX_LINE_QUANTITY + 1)];
        assert_eq!(
            NewOrder::from_cart(&shopper(), &items, Utc::now()),
            Err(OrderDraftError::QuantityTooLarge(ProductId::new(4)))
        );
    }

    #[test]
    fn test_total_must_fit_storage() {
        let at_limit = vec![item(1, "Yacht", MAX_ORDER_TOTAL, 1)];
        let draft = NewOrder::from_cart(&shopper(), &at_limit, Utc::now()).unwrap();
        assert_eq!(draft.total.to_string(), "999999999999.99");

        let over = vec![
            item(1, "Yacht", MAX_ORDER_TOTAL, 1),
            item(2, "Cable", Decimal::new(1, 2), 1),
        ];
        assert!(matches!(
            NewOrder::from_cart(&shopper(), &over, Utc::now()),
            Err(OrderDraftError::TotalTooLarge(_))
        ));
    }

    #[test]
    fn test_visibility_is_owner_or_admin() {
        let items = vec![item(1, "Cable", Decimal::ONE, 1)];
        let order = NewOrder::from_cart(&shopper(), &items, Utc::now())
            .unwrap()
            .into_order(OrderId::new(1));

        let stranger = User {
            id: UserId::new(6),
            username: "other".to_owned(),
            role: Role::User,
        };
        let admin = User {
            id: UserId::new(1),
            username: "admin".to_owned(),
            role: Role::Admin,
        };

        assert!(order.is_visible_to(&shopper()));
        assert!(!order.is_visible_to(&stranger));
        assert!(order.is_visible_to(&admin));
        assert_eq!(order.item_count(), 1);
    }
}
