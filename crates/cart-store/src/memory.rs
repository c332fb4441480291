//! In-memory storage implementation.
//!
//! Carts live in a `BTreeMap` per user so listings come out in product order.
//! A single `RwLock` guards all carts: writers are exclusive, readers share.

use std::collections::BTreeMap;
use std::sync::RwLock;

use cart_core::{CartError, Decimal, LineItem, PriceLookup, Product, ProductId, Result, UserId};

use crate::error::poisoned;
use crate::transition::{self, Transition};
use crate::{CartStore, Catalog};

type Carts = BTreeMap<UserId, BTreeMap<ProductId, LineItem>>;

/// In-memory implementation of `CartStore` and `Catalog`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    carts: RwLock<Carts>,
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the current state of one key under the write lock and apply
    /// the returned transition.
    fn modify<F>(&self, user_id: &UserId, product_id: &ProductId, f: F) -> Result<Option<LineItem>>
    where
        F: FnOnce(Option<LineItem>) -> Result<Transition>,
    {
        let mut carts = self.carts.write().map_err(|_| poisoned("cart"))?;

        let existing = carts
            .get(user_id)
            .and_then(|cart| cart.get(product_id))
            .cloned();

        match f(existing)? {
            Transition::Put(item) => {
                carts
                    .entry(user_id.clone())
                    .or_default()
                    .insert(product_id.clone(), item.clone());
                Ok(Some(item))
            }
            Transition::Delete => {
                remove_entry(&mut carts, user_id, product_id);
                Ok(None)
            }
        }
    }
}

fn remove_entry(carts: &mut Carts, user_id: &UserId, product_id: &ProductId) {
    if let Some(cart) = carts.get_mut(user_id) {
        cart.remove(product_id);
        if cart.is_empty() {
            carts.remove(user_id);
        }
    }
}

fn written(item: Option<LineItem>) -> Result<LineItem> {
    item.ok_or_else(|| CartError::StorageFailure("line item missing after write".into()))
}

impl CartStore for MemoryStore {
    fn upsert(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
        discounted_price: Decimal,
    ) -> Result<LineItem> {
        let item = written(self.modify(user_id, product_id, |existing| {
            transition::upsert(existing, user_id, product_id, quantity, discounted_price)
                .map(Transition::Put)
        })?)?;

        tracing::debug!(
            user_id = %user_id,
            product_id = %product_id,
            quantity = item.quantity,
            amount = %item.amount,
            "Upserted line item"
        );
        Ok(item)
    }

    fn increment(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        discounted_price: Decimal,
    ) -> Result<LineItem> {
        let item = written(self.modify(user_id, product_id, |existing| {
            transition::increment(existing, user_id, product_id, discounted_price)
                .map(Transition::Put)
        })?)?;

        tracing::debug!(
            user_id = %user_id,
            product_id = %product_id,
            quantity = item.quantity,
            "Incremented line item"
        );
        Ok(item)
    }

    fn decrement(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        discounted_price: Decimal,
    ) -> Result<Option<LineItem>> {
        let item = self.modify(user_id, product_id, |existing| {
            transition::decrement(existing, user_id, product_id, discounted_price)
        })?;

        tracing::debug!(
            user_id = %user_id,
            product_id = %product_id,
            quantity = item.as_ref().map_or(0, |i| i.quantity),
            "Decremented line item"
        );
        Ok(item)
    }

    fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
        discounted_price: Decimal,
    ) -> Result<Option<LineItem>> {
        let item = self.modify(user_id, product_id, |existing| {
            transition::set_quantity(existing, user_id, product_id, quantity, discounted_price)
        })?;

        tracing::debug!(
            user_id = %user_id,
            product_id = %product_id,
            requested = quantity,
            "Set line item quantity"
        );
        Ok(item)
    }

    fn delete(&self, user_id: &UserId, product_id: &ProductId) -> Result<()> {
        let mut carts = self.carts.write().map_err(|_| poisoned("cart"))?;
        remove_entry(&mut carts, user_id, product_id);

        tracing::debug!(user_id = %user_id, product_id = %product_id, "Deleted line item");
        Ok(())
    }

    fn clear(&self, user_id: &UserId) -> Result<()> {
        let mut carts = self.carts.write().map_err(|_| poisoned("cart"))?;
        let removed = carts.remove(user_id).map_or(0, |cart| cart.len());

        tracing::debug!(user_id = %user_id, removed, "Cleared cart");
        Ok(())
    }

    fn get(&self, user_id: &UserId, product_id: &ProductId) -> Result<Option<LineItem>> {
        let carts = self.carts.read().map_err(|_| poisoned("cart"))?;
        Ok(carts
            .get(user_id)
            .and_then(|cart| cart.get(product_id))
            .cloned())
    }

    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<LineItem>> {
        let carts = self.carts.read().map_err(|_| poisoned("cart"))?;
        Ok(carts
            .get(user_id)
            .map(|cart| cart.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl Catalog for MemoryStore {
    fn put_product(&self, product: &Product) -> Result<()> {
        product.validate()?;
        let mut products = self.products.write().map_err(|_| poisoned("catalog"))?;
        products.insert(product.id.clone(), product.clone());

        tracing::debug!(product_id = %product.id, price = %product.price, "Stored product");
        Ok(())
    }

    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let products = self.products.read().map_err(|_| poisoned("catalog"))?;
        Ok(products.get(product_id).cloned())
    }

    fn delete_product(&self, product_id: &ProductId) -> Result<()> {
        let mut products = self.products.write().map_err(|_| poisoned("catalog"))?;
        products.remove(product_id);

        tracing::debug!(product_id = %product_id, "Deleted product");
        Ok(())
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        let products = self.products.read().map_err(|_| poisoned("catalog"))?;
        Ok(products.values().cloned().collect())
    }
}

impl PriceLookup for MemoryStore {
    fn discounted_price(&self, product_id: &ProductId) -> Result<Decimal> {
        self.get_product(product_id)?
            .map(|product| product.discounted_price())
            .ok_or_else(|| CartError::product_not_found(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cart_entry_removed() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        let product = ProductId::new("p").unwrap();

        store.upsert(&user, &product, 1, Decimal::ONE).unwrap();
        store.decrement(&user, &product, Decimal::ONE).unwrap();

        assert!(store.carts.read().unwrap().get(&user).is_none());
    }

    #[test]
    fn failed_transition_leaves_state_untouched() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        let product = ProductId::new("p").unwrap();

        store.upsert(&user, &product, 2, Decimal::from(3)).unwrap();
        let err = store
            .upsert(&user, &product, 1, Decimal::from(-1))
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidArgument(_)));

        let item = store.get(&user, &product).unwrap().unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.amount, Decimal::from(6));
    }

    #[test]
    fn overflowing_write_does_not_lock_out_other_carts() {
        let store = MemoryStore::new();
        let alice = UserId::generate();
        let bob = UserId::generate();
        let product = ProductId::new("p").unwrap();

        let err = store
            .upsert(&alice, &product, 3, Decimal::MAX / Decimal::TWO)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidArgument(_)));
        assert!(store.get(&alice, &product).unwrap().is_none());

        store.upsert(&bob, &product, 1, Decimal::ONE).unwrap();
        assert_eq!(store.increment(&bob, &product, Decimal::ONE).unwrap().quantity, 2);
    }
}
