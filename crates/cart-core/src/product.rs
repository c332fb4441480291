//! Catalog product type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CartError, ProductId, Result};

/// A product as seen by the cart: an identifier and its current pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product ID.
    pub id: ProductId,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Unit price.
    pub price: Decimal,

    /// Per-unit discount, if any. Treated as zero when absent.
    #[serde(default)]
    pub discount: Option<Decimal>,
}

impl Product {
    /// Create a product without a discount.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            discount: None,
        }
    }

    /// Set the per-unit discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Unit price minus discount, clamped to zero.
    #[must_use]
    pub fn discounted_price(&self) -> Decimal {
        let discounted = self.price - self.discount.unwrap_or(Decimal::ZERO);
        discounted.max(Decimal::ZERO)
    }

    /// Check that price and discount are non-negative.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if either is negative.
    pub fn validate(&self) -> Result<()> {
        if self.price < Decimal::ZERO {
            return Err(CartError::InvalidArgument(format!(
                "product {} has negative price {}",
                self.id, self.price
            )));
        }
        if let Some(discount) = self.discount {
            if discount < Decimal::ZERO {
                return Err(CartError::InvalidArgument(format!(
                    "product {} has negative discount {discount}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sku(id: &str) -> ProductId {
        ProductId::new(id).unwrap()
    }

    #[test]
    fn discounted_price_without_discount() {
        let product = Product::new(sku("p1"), "Mug", Decimal::new(1250, 2));
        assert_eq!(product.discounted_price(), Decimal::new(1250, 2));
    }

    #[test]
    fn discounted_price_subtracts_discount() {
        let product =
            Product::new(sku("p1"), "Mug", Decimal::new(1250, 2)).with_discount(Decimal::new(250, 2));
        assert_eq!(product.discounted_price(), Decimal::from(10));
    }

    #[test]
    fn discounted_price_clamped_at_zero() {
        let product =
            Product::new(sku("p1"), "Freebie", Decimal::from(5)).with_discount(Decimal::from(8));
        assert_eq!(product.discounted_price(), Decimal::ZERO);
    }

    #[test]
    fn negative_price_rejected() {
        let product = Product::new(sku("p1"), "Bad", Decimal::from(-1));
        assert!(matches!(
            product.validate(),
            Err(CartError::InvalidArgument(_))
        ));
    }

    #[test]
    fn negative_discount_rejected() {
        let product = Product::new(sku("p1"), "Bad", Decimal::ONE).with_discount(Decimal::from(-1));
        assert!(product.validate().is_err());
    }

    #[test]
    fn missing_discount_deserializes_as_none() {
        let product: Product =
            serde_json::from_str(r#"{"id":"p1","name":"Mug","price":"3.50"}"#).unwrap();
        assert_eq!(product.discount, None);
        assert_eq!(product.discounted_price(), Decimal::new(350, 2));
    }
}
