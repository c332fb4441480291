//! Cart service layer.
//!
//! Composes a [`CartStore`] with a [`PriceLookup`]: every write first fetches
//! the product's current discounted price, so the affected line is repriced at
//! today's price.

use std::sync::Arc;

use cart_core::{
    CartError, CartSummary, Decimal, LineItem, PriceLookup, ProductId, Result, UserId,
};
use cart_store::CartStore;

/// Outcome of a quantity change requested through the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// The line item now looks like this.
    Updated(LineItem),
    /// The line item was removed from the cart.
    Removed,
    /// The product was not in the cart; nothing changed.
    NotInCart,
}

/// Cart workflows over a store and a price source.
pub struct CartService<S, P = S> {
    store: Arc<S>,
    prices: Arc<P>,
}

impl<S> CartService<S, S>
where
    S: CartStore + PriceLookup,
{
    /// Use a store that is also its own price source.
    #[must_use]
    pub fn from_store(store: Arc<S>) -> Self {
        Self {
            prices: Arc::clone(&store),
            store,
        }
    }
}

impl<S, P> Clone for CartService<S, P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            prices: Arc::clone(&self.prices),
        }
    }
}

impl<S, P> CartService<S, P>
where
    S: CartStore,
    P: PriceLookup,
{
    /// Create a service from separate store and price source.
    #[must_use]
    pub fn new(store: Arc<S>, prices: Arc<P>) -> Self {
        Self { store, prices }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add `quantity` units of a product at its current price.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the product is not in the catalog.
    /// - `CartError::InvalidArgument` if `quantity <= 0`.
    pub fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<LineItem> {
        let price = self.prices.discounted_price(product_id)?;
        let item = self.store.upsert(user_id, product_id, quantity, price)?;

        tracing::info!(
            user_id = %user_id,
            product_id = %product_id,
            added = quantity,
            quantity = item.quantity,
            "Added to cart"
        );
        Ok(item)
    }

    /// Add one unit of a product already in the cart.
    ///
    /// # Errors
    ///
    /// `CartError::NotFound` if the product is not in the catalog.
    pub fn increase(&self, user_id: &UserId, product_id: &ProductId) -> Result<CartChange> {
        let price = self.prices.discounted_price(product_id)?;
        not_in_cart_as_noop(
            user_id,
            product_id,
            self.store
                .increment(user_id, product_id, price)
                .map(CartChange::Updated),
        )
    }

    /// Remove one unit of a product, dropping the line at zero.
    ///
    /// # Errors
    ///
    /// `CartError::NotFound` if the product is not in the catalog.
    pub fn decrease(&self, user_id: &UserId, product_id: &ProductId) -> Result<CartChange> {
        let price = self.prices.discounted_price(product_id)?;
        not_in_cart_as_noop(
            user_id,
            product_id,
            self.store
                .decrement(user_id, product_id, price)
                .map(changed),
        )
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// A non-positive quantity removes the line without consulting the
    /// catalog, so products that have since been delisted can still be
    /// removed.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the product is not in the catalog.
    /// - `CartError::InvalidArgument` if the quantity overflows.
    pub fn update_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartChange> {
        let price = if quantity > 0 {
            self.prices.discounted_price(product_id)?
        } else {
            Decimal::ZERO
        };
        not_in_cart_as_noop(
            user_id,
            product_id,
            self.store
                .set_quantity(user_id, product_id, quantity, price)
                .map(changed),
        )
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remove(&self, user_id: &UserId, product_id: &ProductId) -> Result<()> {
        self.store.delete(user_id, product_id)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self, user_id: &UserId) -> Result<()> {
        self.store.clear(user_id)?;
        tracing::info!(user_id = %user_id, "Cart cleared");
        Ok(())
    }

    /// Current cart contents with totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn view(&self, user_id: &UserId) -> Result<CartSummary> {
        self.store.summary(user_id)
    }
}

fn changed(item: Option<LineItem>) -> CartChange {
    item.map_or(CartChange::Removed, CartChange::Updated)
}

fn not_in_cart_as_noop(
    user_id: &UserId,
    product_id: &ProductId,
    result: Result<CartChange>,
) -> Result<CartChange> {
    match result {
        Err(err) if err.is_line_item_not_found() => {
            tracing::warn!(
                user_id = %user_id,
                product_id = %product_id,
                "Item not in cart, ignoring"
            );
            Ok(CartChange::NotInCart)
        }
        Err(CartError::StorageFailure(message)) => {
            tracing::error!(user_id = %user_id, error = %message, "Cart storage failure");
            Err(CartError::StorageFailure(message))
        }
        other => other,
    }
}
