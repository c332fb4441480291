//! Price lookup and cart totals.

use rust_decimal::Decimal;

use crate::{CartError, CartSummary, LineItem, ProductId, Result, UserId};

/// Source of current per-unit prices.
///
/// Implemented by the catalog backends; the cart service consults it before
/// every write so that line amounts reflect the price at the time of the
/// operation.
pub trait PriceLookup: Send + Sync {
    /// Current discounted unit price for a product.
    ///
    /// The result is never negative.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the product does not exist.
    /// - `CartError::StorageFailure` if the lookup itself fails.
    fn discounted_price(&self, product_id: &ProductId) -> Result<Decimal>;
}

/// Sums line items into cart totals.
///
/// Totals are always derived from the line items; nothing here is stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartTotalCalculator;

impl CartTotalCalculator {
    /// Sum of `amount` over `items`; zero for an empty slice.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the sum is not representable as
    /// a `Decimal`.
    pub fn total(items: &[LineItem]) -> Result<Decimal> {
        items.iter().try_fold(Decimal::ZERO, |total, item| {
            total.checked_add(item.amount).ok_or_else(|| {
                CartError::InvalidArgument(format!(
                    "cart total overflows at {}",
                    item.product_id
                ))
            })
        })
    }

    /// Sum of `quantity` over `items`.
    #[must_use]
    pub fn item_count(items: &[LineItem]) -> u64 {
        items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Build a summary for `user_id` from its ordered line items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the total overflows.
    pub fn summarize(user_id: UserId, items: Vec<LineItem>) -> Result<CartSummary> {
        let total = Self::total(&items)?;
        let item_count = Self::item_count(&items);
        Ok(CartSummary {
            user_id,
            items,
            item_count,
            total,
        })
    }
}
