//! Identifier types for the cart.
//!
//! Users and products are identified by opaque strings supplied by the caller.
//! Both are validated on construction so that they can be embedded in storage
//! keys without escaping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CartError;

/// Maximum identifier length in bytes.
pub const MAX_ID_LEN: usize = 128;

fn validate(kind: &str, value: &str) -> Result<(), CartError> {
    if value.is_empty() {
        return Err(CartError::InvalidArgument(format!("{kind} must not be empty")));
    }
    if value.len() > MAX_ID_LEN {
        return Err(CartError::InvalidArgument(format!(
            "{kind} exceeds {MAX_ID_LEN} bytes"
        )));
    }
    // NUL separates the user and product halves of a line item key.
    if value.as_bytes().contains(&0) {
        return Err(CartError::InvalidArgument(format!(
            "{kind} must not contain NUL bytes"
        )));
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, validating its contents.
            ///
            /// # Errors
            ///
            /// Returns `CartError::InvalidArgument` if the value is empty, longer
            /// than [`MAX_ID_LEN`] bytes, or contains a NUL byte.
            pub fn new(value: impl Into<String>) -> Result<Self, CartError> {
                let value = value.into();
                validate($kind, &value)?;
                Ok(Self(value))
            }

            /// Generate a new random identifier (for testing).
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the bytes of the identifier.
            #[must_use]
            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }

        impl FromStr for $name {
            type Err = CartError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CartError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }
    };
}

string_id!(
    /// A user identifier.
    ///
    /// Owns one cart; every line item belongs to exactly one user.
    UserId,
    "user id"
);

string_id!(
    /// A product identifier.
    ///
    /// Ordering is byte-wise lexicographic, which is the order in which a
    /// user's line items are listed.
    ProductId,
    "product id"
);
