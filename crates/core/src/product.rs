//! Catalog products.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Longest product name the catalog stores.
pub const MAX_NAME_LENGTH: usize = 200;

/// Highest unit price the catalog stores (9,999,999,999.99).
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Decimal places kept on a stored price.
const PRICE_SCALE: u32 = 2;

/// A purchasable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Current unit price. Carts read it live; orders copy it at checkout.
    pub price: Decimal,
    pub image_url: String,
}

/// Fields an administrator supplies when creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
}

/// Rejected product input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product name is required")]
    EmptyName,
    #[error("product name must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong,
    #[error("product price must not be negative (got {0})")]
    NegativePrice(Decimal),
    #[error("product price must be at most {MAX_PRICE} (got {0})")]
    PriceTooLarge(Decimal),
}

impl ProductInput {
    /// Check the input and return it with surrounding whitespace trimmed and
    /// the price rounded to cents (halves away from zero).
    ///
    /// # Errors
    ///
    /// Returns `ProductError` if the name is blank or too long, or the price
    /// is negative or above [`MAX_PRICE`].
    pub fn validated(self) -> Result<Self, ProductError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ProductError::NameTooLong);
        }
        let price = self
            .price
            .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ProductError::NegativePrice(self.price));
        }
        if price > MAX_PRICE {
            return Err(ProductError::PriceTooLarge(self.price));
        }

        Ok(Self {
            name,
            description: self.description.trim().to_owned(),
            price,
            image_url: self.image_url.trim().to_owned(),
        })
    }

    /// Build the stored product once an ID has been assigned.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(name: &str, price: Decimal) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            description: " Titanium design ".to_owned(),
            price,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_validated_trims_fields() {
        let valid = input("  iPhone 15 Pro ", Decimal::new(999, 0)).validated().unwrap();
        assert_eq!(valid.name, "iPhone 15 Pro");
        assert_eq!(valid.description, "Titanium design");
    }

    #[test]
    fn test_validated_rejects_blank_name() {
        assert_eq!(
            input("   ", Decimal::ONE).validated(),
            Err(ProductError::EmptyName)
        );
    }

    #[test]
    fn test_validated_rejects_negative_price() {
        assert!(matches!(
            input("Mouse", Decimal::new(-1, 0)).validated(),
            Err(ProductError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_validated_rounds_price_to_cents() {
        let valid = input("Mouse", Decimal::new(10_005, 3)).validated().unwrap();
        assert_eq!(valid.price.to_string(), "10.01");

        let valid = input("Mouse", Decimal::new(10_004, 3)).validated().unwrap();
        assert_eq!(valid.price.to_string(), "10.00");
    }

    #[test]
    fn test_validated_rejects_price_above_maximum() {
        assert!(input("Yacht", MAX_PRICE).validated().is_ok());
        assert!(matches!(
            input("Yacht", MAX_PRICE + Decimal::new(1, 2)).validated(),
            Err(ProductError::PriceTooLarge(_))
        ));
        assert_eq!(MAX_PRICE.to_string(), "9999999999.99");
    }

    #[test]
    fn test_free_products_are_allowed() {
        assert!(input("Sticker", Decimal::ZERO).validated().is_ok());
    }

    #[test]
    fn test_input_deserializes_with_defaults() {
        let input: ProductInput =
            serde_json::from_str(r#"{"name":"Mouse","price":"99.99"}"#).unwrap();
        assert_eq!(input.price, Decimal::new(9999, 2));
        assert!(input.image_url.is_empty());
    }
}
