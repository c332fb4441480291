//! Striped lock table for per-cart serialization.
//!
//! A fixed number of mutexes guard all carts. A user's cart always maps to
//! the same stripe, so every read-modify-write on that cart (including
//! `clear`) serializes, while carts on other stripes proceed in parallel.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

use cart_core::{Result, UserId};

use crate::error::poisoned;

/// Default number of stripes.
pub const DEFAULT_STRIPES: usize = 64;

/// A fixed-size table of mutexes keyed by user.
#[derive(Debug)]
pub struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    /// Create a table with `stripes` mutexes (at least one).
    #[must_use]
    pub fn new(stripes: usize) -> Self {
        let stripes = (0..stripes.max(1)).map(|_| Mutex::new(())).collect();
        Self { stripes }
    }

    /// Stripe index for a user.
    #[must_use]
    pub fn stripe_of(&self, user_id: &UserId) -> usize {
        let mut hasher = DefaultHasher::new();
        user_id.hash(&mut hasher);
        // Modulo keeps the value below the stripe count, which fits in usize.
        #[allow(clippy::cast_possible_truncation)]
        let index = (hasher.finish() % self.stripes.len() as u64) as usize;
        index
    }

    /// Lock the stripe guarding `user_id`'s cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StorageFailure` if the mutex was poisoned by a
    /// panicking writer.
    pub fn lock(&self, user_id: &UserId) -> Result<MutexGuard<'_, ()>> {
        self.stripes[self.stripe_of(user_id)]
            .lock()
            .map_err(|_| poisoned("cart"))
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}
