//! Storage layer for the shopping cart.
//!
//! This crate keeps cart line items and catalog products, and guarantees that
//! every read-modify-write on a line item happens as one atomic step.
//!
//! # Backends
//!
//! - [`RocksStore`]: persistent, `RocksDB` with column families
//!   (`line_items`, `products`). Enabled by the `rocksdb-backend` feature.
//! - [`MemoryStore`]: in-memory maps, for tests and ephemeral carts.
//!
//! # Example
//!
//! ```no_run
//! use cart_core::{Decimal, ProductId, UserId};
//! use cart_store::{CartStore, RocksStore};
//!
//! let store = RocksStore::open("/tmp/cart-db").unwrap();
//!
//! let user_id = UserId::generate();
//! let product_id = ProductId::new("sku-1").unwrap();
//! store.upsert(&user_id, &product_id, 2, Decimal::from(10)).unwrap();
//!
//! assert_eq!(store.total(&user_id).unwrap(), Decimal::from(20));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
#[cfg(feature = "rocksdb-backend")]
pub mod keys;
pub mod locks;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;
pub mod transition;

pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use cart_core::{
    CartSummary, CartTotalCalculator, Decimal, LineItem, Product, ProductId, Result, UserId,
};

/// Line item operations.
///
/// Each mutating operation is atomic with respect to other operations on the
/// same `(user, product)` key: concurrent calls serialize and no update is
/// lost. Operations either apply fully or not at all.
pub trait CartStore: Send + Sync {
    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units, creating the line item if absent.
    ///
    /// The amount is recomputed from the resulting quantity at
    /// `discounted_price`, repricing any units already in the cart.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidArgument` if `quantity <= 0`, the price is
    ///   negative, or the resulting quantity or amount overflows.
    /// - `CartError::StorageFailure` if the backend fails.
    fn upsert(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
        discounted_price: Decimal,
    ) -> Result<LineItem>;

    /// Add one unit to an existing line item.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the line item doesn't exist.
    /// - `CartError::InvalidArgument` if the price is negative.
    fn increment(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        discounted_price: Decimal,
    ) -> Result<LineItem>;

    /// Remove one unit from an existing line item, deleting it at zero.
    ///
    /// Returns the updated line item, or `None` if it was deleted.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the line item doesn't exist.
    /// - `CartError::InvalidArgument` if the price is negative.
    fn decrement(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        discounted_price: Decimal,
    ) -> Result<Option<LineItem>>;

    /// Set the quantity of an existing line item.
    ///
    /// A non-positive quantity deletes the line item (no error if absent) and
    /// returns `None`.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if `quantity > 0` and the line item doesn't exist.
    /// - `CartError::InvalidArgument` if the price is negative or the quantity
    ///   overflows.
    fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
        discounted_price: Decimal,
    ) -> Result<Option<LineItem>>;

    /// Remove a line item. Removing an absent line item is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete(&self, user_id: &UserId, product_id: &ProductId) -> Result<()>;

    /// Remove every line item of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn clear(&self, user_id: &UserId) -> Result<()>;

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get one line item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, user_id: &UserId, product_id: &ProductId) -> Result<Option<LineItem>>;

    /// All line items of a user, ordered by product ID ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<LineItem>>;

    /// Sum of line amounts for a user; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidArgument` if the sum overflows.
    /// - `CartError::StorageFailure` if the backend fails.
    fn total(&self, user_id: &UserId) -> Result<Decimal> {
        CartTotalCalculator::total(&self.list_by_user(user_id)?)
    }

    /// Sum of quantities for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn item_count(&self, user_id: &UserId) -> Result<u64> {
        Ok(CartTotalCalculator::item_count(&self.list_by_user(user_id)?))
    }

    /// Line items with their totals, from a single listing.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidArgument` if the total overflows.
    /// - `CartError::StorageFailure` if the backend fails.
    fn summary(&self, user_id: &UserId) -> Result<CartSummary> {
        let items = self.list_by_user(user_id)?;
        CartTotalCalculator::summarize(user_id.clone(), items)
    }
}

/// Product catalog operations.
pub trait Catalog: Send + Sync {
    /// Insert or replace a product.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidArgument` if the price or discount is negative.
    /// - `CartError::StorageFailure` if the backend fails.
    fn put_product(&self, product: &Product) -> Result<()>;

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>>;

    /// Remove a product. Removing an absent product is not an error.
    ///
    /// Line items already holding the product are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete_product(&self, product_id: &ProductId) -> Result<()>;

    /// All products ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_products(&self) -> Result<Vec<Product>>;
}
