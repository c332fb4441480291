//! Key encoding utilities for `RocksDB`.
//!
//! Line item keys put the user first so that a prefix scan returns one cart.
//! Identifiers never contain NUL, so `0x00` terminates the user part
//! unambiguously and a user's keys sort by product ID.

use cart_core::{ProductId, UserId};

const SEPARATOR: u8 = 0;

/// Create a line item key.
///
/// Format: `user_id || 0x00 || product_id`
#[must_use]
pub fn line_item_key(user_id: &UserId, product_id: &ProductId) -> Vec<u8> {
    let mut key = user_prefix(user_id);
    key.extend_from_slice(product_id.as_bytes());
    key
}

/// Create the prefix shared by all line items of a user.
#[must_use]
pub fn user_prefix(user_id: &UserId) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_id.as_bytes().len() + 1);
    key.extend_from_slice(user_id.as_bytes());
    key.push(SEPARATOR);
    key
}

/// Create a product key.
#[must_use]
pub fn product_key(product_id: &ProductId) -> Vec<u8> {
    product_id.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn product(s: &str) -> ProductId {
        ProductId::new(s).unwrap()
    }

    #[test]
    fn line_item_key_format() {
        let key = line_item_key(&user("u1"), &product("p9"));
        assert_eq!(key, b"u1\0p9");
    }

    #[test]
    fn prefix_does_not_match_longer_user() {
        // "u1" must not pick up the cart of "u10".
        let prefix = user_prefix(&user("u1"));
        let other = line_item_key(&user("u10"), &product("p1"));
        assert!(!other.starts_with(&prefix));
        assert!(line_item_key(&user("u1"), &product("p1")).starts_with(&prefix));
    }

    #[test]
    fn keys_sort_by_product_within_user() {
        let u = user("u1");
        let mut keys = vec![
            line_item_key(&u, &product("b")),
            line_item_key(&u, &product("a")),
            line_item_key(&u, &product("ab")),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                line_item_key(&u, &product("a")),
                line_item_key(&u, &product("ab")),
                line_item_key(&u, &product("b")),
            ]
        );
    }
}
