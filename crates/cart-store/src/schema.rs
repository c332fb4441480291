//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Cart line items, keyed by `user_id || 0x00 || product_id`.
    pub const LINE_ITEMS: &str = "line_items";

    /// Catalog products, keyed by `product_id`.
    pub const PRODUCTS: &str = "products";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::LINE_ITEMS, cf::PRODUCTS]
}
