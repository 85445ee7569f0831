//! Session cart.
//!
//! A [`Cart`] only remembers *which* products were picked and how many. Prices
//! are read from the catalog every time the cart is shown, so the storefront
//! resolves lines into [`CartItem`]s (line + current [`Product`]) before
//! computing totals. Orders copy those prices at checkout; the cart never does.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::product::Product;
use crate::types::ProductId;

/// Largest quantity a single cart line may hold.
///
/// Order item quantities are stored as 32-bit signed integers.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// Failures while mutating or summarizing a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity for product {0} would exceed the supported maximum")]
    QuantityOverflow(ProductId),
    #[error("quantity {0} is larger than the supported maximum")]
    QuantityTooLarge(i64),
    #[error("cart item count exceeds the supported maximum")]
    CountOverflow,
}

/// One product in the cart and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Per-session selection of products, in the order they were first added.
///
/// Holds at most one line per product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of a product, merging into an existing line.
    ///
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityOverflow` if the line is already at
    /// [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, product_id: ProductId) -> Result<u32, CartError> {
        if let Some(line) = self.line_mut(product_id) {
            if line.quantity >= MAX_LINE_QUANTITY {
                return Err(CartError::QuantityOverflow(product_id));
            }
            line.quantity += 1;
            return Ok(line.quantity);
        }

        self.lines.push(CartLine {
            product_id,
            quantity: 1,
        });
        Ok(1)
    }

    /// Drop the line for a product. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Set a line's quantity. Zero or negative quantities remove the line.
    ///
    /// Products that are not in the cart are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityTooLarge` if `quantity` is above
    /// [`MAX_LINE_QUANTITY`].
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or(CartError::QuantityTooLarge(quantity))?;
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a product, or zero if it is not in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map_or(0, |line| line.quantity)
    }

    /// Sum of all line quantities.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CountOverflow` if the sum does not fit a `u32`.
    pub fn item_count(&self) -> Result<u32, CartError> {
        self.lines.iter().try_fold(0_u32, |count, line| {
            count
                .checked_add(line.quantity)
                .ok_or(CartError::CountOverflow)
        })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

/// A cart line joined with the product as it is in the catalog right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// `quantity × current price`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Total of resolved cart items at current catalog prices.
///
/// Order creation uses the same function so a checkout total always equals
/// the cart total shown a moment before.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i32, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_adding_same_product_twice_merges_lines() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1)).unwrap();
        let quantity = cart.add(ProductId::new(1)).unwrap();

        assert_eq!(quantity, 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        for id in [3, 1, 2, 1] {
            cart.add(ProductId::new(id)).unwrap();
        }

        let ids: Vec<i32> = cart.lines().iter().map(|l| l.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes_line() {
        for quantity in [0, -5] {
            let mut cart = Cart::new();
            cart.add(ProductId::new(1)).unwrap();
            cart.add(ProductId::new(2)).unwrap();

            cart.update_quantity(ProductId::new(1), quantity).unwrap();

            assert_eq!(cart.quantity_of(ProductId::new(1)), 0);
            assert_eq!(cart.lines().len(), 1);
        }
    }

    #[test]
    fn test_update_quantity_sets_existing_line() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1)).unwrap();

        cart.update_quantity(ProductId::new(1), 7).unwrap();

        assert_eq!(cart.quantity_of(ProductId::new(1)), 7);
    }

    #[test]
    fn test_update_quantity_ignores_missing_product() {
        let mut cart = Cart::new();
        cart.update_quantity(ProductId::new(9), 3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_rejects_oversized_value() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1)).unwrap();

        for quantity in [i64::from(MAX_LINE_QUANTITY) + 1, 3_000_000_000, i64::MAX] {
            let result = cart.update_quantity(ProductId::new(1), quantity);
            assert_eq!(result, Err(CartError::QuantityTooLarge(quantity)));
        }
        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_update_quantity_accepts_line_maximum() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1)).unwrap();

        cart.update_quantity(ProductId::new(1), i64::from(MAX_LINE_QUANTITY)).unwrap();

        assert_eq!(cart.quantity_of(ProductId::new(1)), MAX_LINE_QUANTITY);
        assert!(i32::try_from(MAX_LINE_QUANTITY).is_ok());
    }

    #[test]
    fn test_remove_missing_product_is_noop() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1)).unwrap();
        assert!(!cart.remove(ProductId::new(2)));
        assert!(cart.remove(ProductId::new(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow_is_reported() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1)).unwrap();
        cart.update_quantity(ProductId::new(1), i64::from(MAX_LINE_QUANTITY)).unwrap();

        assert_eq!(
            cart.add(ProductId::new(1)),
            Err(CartError::QuantityOverflow(ProductId::new(1)))
        );
        assert_eq!(cart.quantity_of(ProductId::new(1)), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1)).unwrap();
        cart.add(ProductId::new(1)).unwrap();
        cart.add(ProductId::new(2)).unwrap();

        assert_eq!(cart.item_count(), Ok(3));
    }

    #[test]
    fn test_cart_total_uses_given_prices() {
        let items = vec![
            CartItem {
                product: product(1, Decimal::new(10, 0)),
                quantity: 2,
            },
            CartItem {
                product: product(2, Decimal::new(5, 0)),
                quantity: 1,
            },
        ];

        assert_eq!(cart_total(&items), Decimal::new(25, 0));
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_is_exact_decimal() {
        let item = CartItem {
            product: product(1, Decimal::new(1010, 2)),
            quantity: 2,
        };
        assert_eq!(item.line_total(), Decimal::new(2020, 2));
    }
}
