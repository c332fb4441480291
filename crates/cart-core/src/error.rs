//! Error types for the cart.

use std::fmt;

use crate::{ProductId, UserId};

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;

/// Errors that can occur in cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The operation required an existing line item or product and none exists.
    #[error("{what} not found: {id}")]
    NotFound {
        /// Kind of record that was missing.
        what: Entity,
        /// Identifier of the missing record.
        id: String,
    },

    /// The caller supplied an invalid quantity, price, or identifier.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store failed. The message is passed through unmodified.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

/// Record kinds that can be reported missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A cart line item, identified by `user/product`.
    LineItem,
    /// A catalog product.
    Product,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineItem => f.write_str("line item"),
            Self::Product => f.write_str("product"),
        }
    }
}

impl CartError {
    /// Missing line item for `(user, product)`.
    #[must_use]
    pub fn line_item_not_found(user_id: &UserId, product_id: &ProductId) -> Self {
        Self::NotFound {
            what: Entity::LineItem,
            id: format!("{user_id}/{product_id}"),
        }
    }

    /// Missing catalog product.
    #[must_use]
    pub fn product_not_found(product_id: &ProductId) -> Self {
        Self::NotFound {
            what: Entity::Product,
            id: product_id.to_string(),
        }
    }

    /// Returns `true` for [`CartError::NotFound`] of any kind.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if a line item was missing.
    #[must_use]
    pub const fn is_line_item_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound {
                what: Entity::LineItem,
                ..
            }
        )
    }
}
