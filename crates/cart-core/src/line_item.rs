//! Cart line items.
//!
//! A line item records how many units of one product a user holds in their
//! cart, together with the amount charged for them at the time of the last
//! write.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CartError, ProductId, Result, UserId};

/// Largest quantity a single line item can hold.
pub const MAX_QUANTITY: u32 = u32::MAX;

/// One row of a user's cart.
///
/// `quantity` is always at least one. A line item whose quantity would reach
/// zero is deleted instead of stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The cart owner.
    pub user_id: UserId,

    /// The product held.
    pub product_id: ProductId,

    /// Number of units, never zero.
    pub quantity: u32,

    /// `quantity * discounted_price` as of the last write. Not refreshed when
    /// the catalog price changes.
    pub amount: Decimal,

    /// When the line item was last written.
    pub updated_at: DateTime<Utc>,
}

impl LineItem {
    /// Create a line item priced at `discounted_price` per unit.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if `quantity` is zero, the price
    /// is negative, or the amount overflows.
    pub fn new(
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        discounted_price: Decimal,
    ) -> Result<Self> {
        if quantity == 0 {
            return Err(CartError::InvalidArgument(
                "line item quantity must be positive".into(),
            ));
        }
        validate_price(discounted_price)?;
        Ok(Self {
            user_id,
            product_id,
            quantity,
            amount: line_amount(quantity, discounted_price)?,
            updated_at: Utc::now(),
        })
    }

    /// Replace the quantity and recompute the amount from the full quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if `quantity` is zero or the amount
    /// overflows. The line item is unchanged on error.
    pub fn reprice(&mut self, quantity: u32, discounted_price: Decimal) -> Result<()> {
        if quantity == 0 {
            return Err(CartError::InvalidArgument(
                "line item quantity must be positive".into(),
            ));
        }
        let amount = line_amount(quantity, discounted_price)?;
        self.quantity = quantity;
        self.amount = amount;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// `quantity * unit_price`.
///
/// # Errors
///
/// Returns `CartError::InvalidArgument` if the product is not representable
/// as a `Decimal`.
pub fn line_amount(quantity: u32, unit_price: Decimal) -> Result<Decimal> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or_else(|| {
            CartError::InvalidArgument(format!(
                "line amount {quantity} x {unit_price} overflows"
            ))
        })
}

/// Reject negative unit prices.
///
/// # Errors
///
/// Returns `CartError::InvalidArgument` if `price < 0`.
pub fn validate_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(CartError::InvalidArgument(format!(
            "discounted price must not be negative, got {price}"
        )));
    }
    Ok(())
}

/// Convert a caller-supplied quantity into a stored one.
///
/// # Errors
///
/// Returns `CartError::InvalidArgument` if `quantity <= 0` or it exceeds
/// [`MAX_QUANTITY`].
pub fn positive_quantity(quantity: i64) -> Result<u32> {
    if quantity <= 0 {
        return Err(CartError::InvalidArgument(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    u32::try_from(quantity).map_err(|_| {
        CartError::InvalidArgument(format!("quantity {quantity} exceeds {MAX_QUANTITY}"))
    })
}

/// Add `delta` units to an existing quantity.
///
/// # Errors
///
/// Returns `CartError::InvalidArgument` on overflow.
pub fn add_quantity(current: u32, delta: u32) -> Result<u32> {
    current.checked_add(delta).ok_or_else(|| {
        CartError::InvalidArgument(format!(
            "quantity {current} + {delta} exceeds {MAX_QUANTITY}"
        ))
    })
}

/// A user's cart as displayed: ordered line items plus derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// The cart owner.
    pub user_id: UserId,

    /// Line items ordered by product ID.
    pub items: Vec<LineItem>,

    /// Sum of quantities (not the number of rows).
    pub item_count: u64,

    /// Sum of line amounts.
    pub total: Decimal,
}

impl CartSummary {
    /// Returns `true` if the cart holds no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
