//! Error mapping for storage backends.
//!
//! Backends report every failure of the underlying store as
//! `CartError::StorageFailure`, carrying the original message unmodified.

use std::fmt::Display;

use cart_core::CartError;

pub use cart_core::Result;

/// Wrap a backend error.
#[must_use]
pub fn storage<E: Display>(err: E) -> CartError {
    CartError::StorageFailure(err.to_string())
}

/// Error for a poisoned lock, named after what it guards.
#[must_use]
pub fn poisoned(what: &str) -> CartError {
    CartError::StorageFailure(format!("{what} lock poisoned"))
}
