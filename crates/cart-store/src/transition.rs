//! Line item state transitions.
//!
//! Each function takes the current state of one `(user, product)` key and
//! returns the write to apply. Backends call these while holding the key's
//! lock, so the read and the write form a single step.

use cart_core::{
    add_quantity, positive_quantity, validate_price, CartError, Decimal, LineItem, ProductId,
    Result, UserId,
};

/// The write a backend must apply for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Store this line item.
    Put(LineItem),
    /// Remove the line item if present.
    Delete,
}

impl Transition {
    /// The stored line item after the write, if any.
    #[must_use]
    pub fn into_line_item(self) -> Option<LineItem> {
        match self {
            Self::Put(item) => Some(item),
            Self::Delete => None,
        }
    }
}

/// Add `quantity` units, creating the line item if absent.
///
/// # Errors
///
/// `CartError::InvalidArgument` for a non-positive quantity, a negative price,
/// or quantity or amount overflow.
pub fn upsert(
    existing: Option<LineItem>,
    user_id: &UserId,
    product_id: &ProductId,
    quantity: i64,
    discounted_price: Decimal,
) -> Result<LineItem> {
    let quantity = positive_quantity(quantity)?;
    validate_price(discounted_price)?;

    match existing {
        Some(mut item) => {
            let total = add_quantity(item.quantity, quantity)?;
            item.reprice(total, discounted_price)?;
            Ok(item)
        }
        None => LineItem::new(
            user_id.clone(),
            product_id.clone(),
            quantity,
            discounted_price,
        ),
    }
}

/// Add one unit to an existing line item.
///
/// # Errors
///
/// `CartError::NotFound` if absent; `CartError::InvalidArgument` for a negative
/// price or quantity or amount overflow.
pub fn increment(
    existing: Option<LineItem>,
    user_id: &UserId,
    product_id: &ProductId,
    discounted_price: Decimal,
) -> Result<LineItem> {
    validate_price(discounted_price)?;
    let mut item = existing.ok_or_else(|| CartError::line_item_not_found(user_id, product_id))?;
    let quantity = add_quantity(item.quantity, 1)?;
    item.reprice(quantity, discounted_price)?;
    Ok(item)
}

/// Remove one unit from an existing line item, deleting it when none remain.
///
/// # Errors
///
/// `CartError::NotFound` if absent; `CartError::InvalidArgument` for a negative
/// price or amount overflow.
pub fn decrement(
    existing: Option<LineItem>,
    user_id: &UserId,
    product_id: &ProductId,
    discounted_price: Decimal,
) -> Result<Transition> {
    validate_price(discounted_price)?;
    let mut item = existing.ok_or_else(|| CartError::line_item_not_found(user_id, product_id))?;
    if item.quantity <= 1 {
        return Ok(Transition::Delete);
    }
    item.reprice(item.quantity - 1, discounted_price)?;
    Ok(Transition::Put(item))
}

/// Overwrite the quantity of an existing line item.
///
/// A non-positive quantity deletes, whether or not the line item exists.
///
/// # Errors
///
/// `CartError::NotFound` if `quantity > 0` and absent;
/// `CartError::InvalidArgument` for a negative price or quantity or amount
/// overflow.
pub fn set_quantity(
    existing: Option<LineItem>,
    user_id: &UserId,
    product_id: &ProductId,
    quantity: i64,
    discounted_price: Decimal,
) -> Result<Transition> {
    validate_price(discounted_price)?;
    if quantity <= 0 {
        return Ok(Transition::Delete);
    }
    let quantity = positive_quantity(quantity)?;
    let mut item = existing.ok_or_else(|| CartError::line_item_not_found(user_id, product_id))?;
    item.reprice(quantity, discounted_price)?;
    Ok(Transition::Put(item))
}
