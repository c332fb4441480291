//! Core types and utilities for the shopping cart.
//!
//! This crate provides the foundational types shared by the store backends and
//! the cart service:
//!
//! - **Identifiers**: `UserId`, `ProductId`
//! - **Catalog**: `Product`, `PriceLookup`
//! - **Cart**: `LineItem`, `CartSummary`, `CartTotalCalculator`
//! - **Errors**: `CartError`
//!
//! # Line item invariants
//!
//! A line item exists for a `(user, product)` pair only while its quantity is
//! at least one. Its `amount` is a snapshot of `quantity * discounted_price`
//! taken by the last operation that wrote it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod line_item;
pub mod pricing;
pub mod product;

pub use error::{CartError, Entity, Result};
pub use ids::{ProductId, UserId, MAX_ID_LEN};
pub use line_item::{
    add_quantity, line_amount, positive_quantity, validate_price, CartSummary, LineItem,
    MAX_QUANTITY,
};
pub use pricing::{CartTotalCalculator, PriceLookup};
pub use product::Product;

pub use rust_decimal::Decimal;
