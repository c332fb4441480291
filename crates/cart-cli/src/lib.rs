//! Cart service layer and command-line front end.
//!
//! This crate wires a cart store to a price source and exposes the cart
//! workflows (add, increase, decrease, update, remove, clear, view) used by
//! the `cart` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod service;

pub use config::{Backend, CartConfig, ConfigError};
pub use service::{CartChange, CartService};

use cart_core::Result;
use cart_store::Catalog;

/// Insert `products` into `catalog`, replacing existing entries.
///
/// # Errors
///
/// Returns the first product validation or storage error.
pub fn seed_catalog<C: Catalog + ?Sized>(
    catalog: &C,
    products: &[cart_core::Product],
) -> Result<usize> {
    for product in products {
        catalog.put_product(product)?;
    }
    Ok(products.len())
}
