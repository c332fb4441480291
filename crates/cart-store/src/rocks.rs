//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `CartStore` and
//! `Catalog` traits.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use cart_core::{
    CartError, Decimal, LineItem, PriceLookup, Product, ProductId, Result, UserId,
};

use crate::error::storage;
use crate::keys;
use crate::locks::{KeyLocks, DEFAULT_STRIPES};
use crate::schema::{all_column_families, cf};
use crate::transition::{self, Transition};
use crate::{CartStore, Catalog};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    locks: KeyLocks,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_stripes(path, DEFAULT_STRIPES)
    }

    /// Open with an explicit lock table size.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open_with_stripes<P: AsRef<Path>>(path: P, stripes: usize) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)
            .map_err(storage)?;

        tracing::info!(path = %path.as_ref().display(), stripes, "Opened RocksDB cart store");

        Ok(Self {
            db: Arc::new(db),
            locks: KeyLocks::new(stripes),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CartError::StorageFailure(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf).map_err(storage)?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(storage)
    }

    fn read_line_item(&self, user_id: &UserId, product_id: &ProductId) -> Result<Option<LineItem>> {
        let cf = self.cf(cf::LINE_ITEMS)?;
        let key = keys::line_item_key(user_id, product_id);

        self.db
            .get_cf(&cf, key)
            .map_err(storage)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn write_line_item(&self, item: &LineItem) -> Result<()> {
        let cf = self.cf(cf::LINE_ITEMS)?;
        let key = keys::line_item_key(&item.user_id, &item.product_id);
        let value = Self::serialize(item)?;

        self.db.put_cf(&cf, key, value).map_err(storage)
    }

    fn remove_line_item(&self, user_id: &UserId, product_id: &ProductId) -> Result<()> {
        let cf = self.cf(cf::LINE_ITEMS)?;
        let key = keys::line_item_key(user_id, product_id);

        self.db.delete_cf(&cf, key).map_err(storage)
    }

    fn apply(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        transition: Transition,
    ) -> Result<Option<LineItem>> {
        match transition {
            Transition::Put(item) => {
                self.write_line_item(&item)?;
                Ok(Some(item))
            }
            Transition::Delete => {
                self.remove_line_item(user_id, product_id)?;
                Ok(None)
            }
        }
    }

    /// Keys of every line item in a user's cart, in product order.
    fn user_keys(&self, user_id: &UserId) -> Result<Vec<Box<[u8]>>> {
        let cf = self.cf(cf::LINE_ITEMS)?;
        let prefix = keys::user_prefix(user_id);

        let mut found = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, _) = item.map_err(storage)?;
            if !key.starts_with(&prefix) {
                break;
            }
            found.push(key);
        }
        Ok(found)
    }
}

impl CartStore for RocksStore {
    // =========================================================================
    // Mutations
    // =========================================================================

    fn upsert(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
        discounted_price: Decimal,
    ) -> Result<LineItem> {
        let _guard = self.locks.lock(user_id)?;

        let existing = self.read_line_item(user_id, product_id)?;
        let item = transition::upsert(existing, user_id, product_id, quantity, discounted_price)?;
        self.write_line_item(&item)?;

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
        let _guard = self.locks.lock(user_id)?;

        let existing = self.read_line_item(user_id, product_id)?;
        let item = transition::increment(existing, user_id, product_id, discounted_price)?;
        self.write_line_item(&item)?;

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
        let _guard = self.locks.lock(user_id)?;

        let existing = self.read_line_item(user_id, product_id)?;
        let next = transition::decrement(existing, user_id, product_id, discounted_price)?;
        let item = self.apply(user_id, product_id, next)?;

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
        let _guard = self.locks.lock(user_id)?;

        let existing = self.read_line_item(user_id, product_id)?;
        let next =
            transition::set_quantity(existing, user_id, product_id, quantity, discounted_price)?;
        let item = self.apply(user_id, product_id, next)?;

        tracing::debug!(
            user_id = %user_id,
            product_id = %product_id,
            requested = quantity,
            "Set line item quantity"
        );
        Ok(item)
    }

    fn delete(&self, user_id: &UserId, product_id: &ProductId) -> Result<()> {
        let _guard = self.locks.lock(user_id)?;
        self.remove_line_item(user_id, product_id)?;

        tracing::debug!(user_id = %user_id, product_id = %product_id, "Deleted line item");
        Ok(())
    }

    fn clear(&self, user_id: &UserId) -> Result<()> {
        let _guard = self.locks.lock(user_id)?;

        let cf = self.cf(cf::LINE_ITEMS)?;
        let keys = self.user_keys(user_id)?;
        let removed = keys.len();

        // Delete atomically
        let mut batch = WriteBatch::default();
        for key in keys {
            batch.delete_cf(&cf, key);
        }
        self.db.write(batch).map_err(storage)?;

        tracing::debug!(user_id = %user_id, removed, "Cleared cart");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn get(&self, user_id: &UserId, product_id: &ProductId) -> Result<Option<LineItem>> {
        self.read_line_item(user_id, product_id)
    }

    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<LineItem>> {
        let cf = self.cf(cf::LINE_ITEMS)?;
        let prefix = keys::user_prefix(user_id);

        let mut items = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));
        for entry in iter {
            let (key, value) = entry.map_err(storage)?;
            if !key.starts_with(&prefix) {
                break;
            }
            items.push(Self::deserialize(&value)?);
        }
        Ok(items)
    }
}

impl Catalog for RocksStore {
    fn put_product(&self, product: &Product) -> Result<()> {
        product.validate()?;

        let cf = self.cf(cf::PRODUCTS)?;
        let key = keys::product_key(&product.id);
        let value = Self::serialize(product)?;

        self.db.put_cf(&cf, key, value).map_err(storage)?;

        tracing::debug!(product_id = %product.id, price = %product.price, "Stored product");
        Ok(())
    }

    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let cf = self.cf(cf::PRODUCTS)?;
        let key = keys::product_key(product_id);

        self.db
            .get_cf(&cf, key)
            .map_err(storage)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn delete_product(&self, product_id: &ProductId) -> Result<()> {
        let cf = self.cf(cf::PRODUCTS)?;
        let key = keys::product_key(product_id);

        self.db.delete_cf(&cf, key).map_err(storage)?;

        tracing::debug!(product_id = %product_id, "Deleted product");
        Ok(())
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        let cf = self.cf(cf::PRODUCTS)?;

        let mut products = Vec::new();
        for entry in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = entry.map_err(storage)?;
            products.push(Self::deserialize(&value)?);
        }
        Ok(products)
    }
}

impl PriceLookup for RocksStore {
    fn discounted_price(&self, product_id: &ProductId) -> Result<Decimal> {
        self.get_product(product_id)?
            .map(|product| product.discounted_price())
            .ok_or_else(|| CartError::product_not_found(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn product(id: &str) -> ProductId {
        ProductId::new(id).unwrap()
    }

    #[test]
    fn line_item_crud() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();
        let p = product("sku-1");

        // Create
        let item = store.upsert(&user_id, &p, 2, Decimal::from(10)).unwrap();
        assert_eq!(item.amount, Decimal::from(20));

        // Read
        let retrieved = store.get(&user_id, &p).unwrap().unwrap();
        assert_eq!(retrieved.quantity, 2);

        // Update
        store.increment(&user_id, &p, Decimal::from(10)).unwrap();
        assert_eq!(store.get(&user_id, &p).unwrap().unwrap().quantity, 3);

        // Delete
        store.delete(&user_id, &p).unwrap();
        assert!(store.get(&user_id, &p).unwrap().is_none());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let user_id = UserId::new("u1").unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store
                .upsert(&user_id, &product("a"), 4, Decimal::new(250, 2))
                .unwrap();
            store
                .put_product(&Product::new(product("a"), "Apple", Decimal::new(250, 2)))
                .unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        let item = store.get(&user_id, &product("a")).unwrap().unwrap();
        assert_eq!(item.quantity, 4);
        assert_eq!(item.amount, Decimal::from(10));
        assert_eq!(
            store.discounted_price(&product("a")).unwrap(),
            Decimal::new(250, 2)
        );
    }

    #[test]
    fn list_does_not_leak_prefix_neighbours() {
        let (store, _dir) = create_test_store();
        let u1 = UserId::new("u1").unwrap();
        let u10 = UserId::new("u10").unwrap();

        store.upsert(&u1, &product("a"), 1, Decimal::ONE).unwrap();
        store.upsert(&u10, &product("a"), 5, Decimal::ONE).unwrap();

        let items = store.list_by_user(&u1).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);

        store.clear(&u1).unwrap();
        assert_eq!(store.item_count(&u10).unwrap(), 5);
    }

    #[test]
    fn catalog_lists_in_id_order() {
        let (store, _dir) = create_test_store();
        for id in ["c", "a", "b"] {
            store
                .put_product(&Product::new(product(id), id, Decimal::ONE))
                .unwrap();
        }

        let ids: Vec<String> = store
            .list_products()
            .unwrap()
            .into_iter()
            .map(|p| p.id.into())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);

        store.delete_product(&product("b")).unwrap();
        assert!(store.get_product(&product("b")).unwrap().is_none());
        assert!(store
            .discounted_price(&product("b"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn invalid_product_not_stored() {
        let (store, _dir) = create_test_store();
        let bad = Product::new(product("x"), "Bad", Decimal::from(-5));
        assert!(matches!(
            store.put_product(&bad),
            Err(CartError::InvalidArgument(_))
        ));
        assert!(store.get_product(&product("x")).unwrap().is_none());
    }

    #[test]
    fn overflowing_write_releases_stripe() {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open_with_stripes(dir.path(), 1).unwrap();
        let alice = UserId::generate();
        let bob = UserId::generate();
        let p = product("p");

        assert!(matches!(
            store.upsert(&alice, &p, 3, Decimal::MAX / Decimal::TWO),
            Err(CartError::InvalidArgument(_))
        ));
        assert!(store.get(&alice, &p).unwrap().is_none());

        // One stripe: bob shares alice's lock.
        store.upsert(&bob, &p, 1, Decimal::ONE).unwrap();
        assert_eq!(store.increment(&bob, &p, Decimal::ONE).unwrap().quantity, 2);
    }
}
