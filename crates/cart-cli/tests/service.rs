//! Cart service workflow tests.

use std::sync::Arc;

use cart_cli::{seed_catalog, CartChange, CartService};
use cart_core::{CartError, Decimal, Product, ProductId, UserId};
use cart_store::{CartStore, Catalog, MemoryStore};

/// Test harness: a memory store with a small catalog.
struct TestHarness {
    service: CartService<MemoryStore>,
    store: Arc<MemoryStore>,
    user: UserId,
}

impl TestHarness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        seed_catalog(
            store.as_ref(),
            &[
                Product::new(sku("mug"), "Mug", Decimal::new(1250, 2))
                    .with_discount(Decimal::new(250, 2)),
                Product::new(sku("tee"), "T-shirt", Decimal::from(20)),
            ],
        )
        .unwrap();

        Self {
            service: CartService::from_store(Arc::clone(&store)),
            store,
            user: UserId::generate(),
        }
    }
}

fn sku(id: &str) -> ProductId {
    ProductId::new(id).unwrap()
}

// ============================================================================
// Add to cart
// ============================================================================

#[test]
fn add_to_cart_uses_discounted_price() {
    let h = TestHarness::new();

    let item = h.service.add_to_cart(&h.user, &sku("mug"), 3).unwrap();
    assert_eq!(item.quantity, 3);
    assert_eq!(item.amount, Decimal::from(30));
}

#[test]
fn add_to_cart_unknown_product_fails() {
    let h = TestHarness::new();

    let err = h.service.add_to_cart(&h.user, &sku("nope"), 1).unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_line_item_not_found());
    assert!(h.store.list_by_user(&h.user).unwrap().is_empty());
}

#[test]
fn add_to_cart_reprices_whole_line_after_price_change() {
    let h = TestHarness::new();
    h.service.add_to_cart(&h.user, &sku("tee"), 2).unwrap();

    h.store
        .put_product(&Product::new(sku("tee"), "T-shirt", Decimal::from(15)))
        .unwrap();
    let item = h.service.add_to_cart(&h.user, &sku("tee"), 1).unwrap();

    assert_eq!(item.quantity, 3);
    assert_eq!(item.amount, Decimal::from(45));
}

#[test]
fn add_to_cart_rejects_non_positive_quantity() {
    let h = TestHarness::new();
    assert!(matches!(
        h.service.add_to_cart(&h.user, &sku("tee"), 0),
        Err(CartError::InvalidArgument(_))
    ));
}

// ============================================================================
// Quantity changes
// ============================================================================

#[test]
fn increase_and_decrease() {
    let h = TestHarness::new();
    h.service.add_to_cart(&h.user, &sku("tee"), 1).unwrap();

    match h.service.increase(&h.user, &sku("tee")).unwrap() {
        CartChange::Updated(item) => {
            assert_eq!(item.quantity, 2);
            assert_eq!(item.amount, Decimal::from(40));
        }
        other => panic!("unexpected change: {other:?}"),
    }

    assert!(matches!(
        h.service.decrease(&h.user, &sku("tee")).unwrap(),
        CartChange::Updated(ref item) if item.quantity == 1
    ));
    assert_eq!(
        h.service.decrease(&h.user, &sku("tee")).unwrap(),
        CartChange::Removed
    );
    assert!(h.store.get(&h.user, &sku("tee")).unwrap().is_none());
}

#[test]
fn missing_line_item_is_a_noop() {
    let h = TestHarness::new();

    assert_eq!(
        h.service.increase(&h.user, &sku("mug")).unwrap(),
        CartChange::NotInCart
    );
    assert_eq!(
        h.service.decrease(&h.user, &sku("mug")).unwrap(),
        CartChange::NotInCart
    );
    assert_eq!(
        h.service.update_quantity(&h.user, &sku("mug"), 4).unwrap(),
        CartChange::NotInCart
    );
    assert!(h.store.list_by_user(&h.user).unwrap().is_empty());
}

#[test]
fn update_quantity_sets_and_removes() {
    let h = TestHarness::new();
    h.service.add_to_cart(&h.user, &sku("mug"), 1).unwrap();

    assert!(matches!(
        h.service.update_quantity(&h.user, &sku("mug"), 5).unwrap(),
        CartChange::Updated(ref item) if item.amount == Decimal::from(50)
    ));
    assert_eq!(
        h.service.update_quantity(&h.user, &sku("mug"), 0).unwrap(),
        CartChange::Removed
    );
}

#[test]
fn delisted_product_can_still_be_removed() {
    let h = TestHarness::new();
    h.service.add_to_cart(&h.user, &sku("mug"), 2).unwrap();
    h.store.delete_product(&sku("mug")).unwrap();

    // Repricing needs the catalog...
    assert!(h.service.increase(&h.user, &sku("mug")).unwrap_err().is_not_found());

    // ...removal doesn't.
    assert_eq!(
        h.service.update_quantity(&h.user, &sku("mug"), 0).unwrap(),
        CartChange::Removed
    );
}

// ============================================================================
// View / clear
// ============================================================================

#[test]
fn view_orders_items_and_totals() {
    let h = TestHarness::new();
    h.service.add_to_cart(&h.user, &sku("tee"), 1).unwrap();
    h.service.add_to_cart(&h.user, &sku("mug"), 2).unwrap();

    let summary = h.service.view(&h.user).unwrap();
    let ids: Vec<&str> = summary.items.iter().map(|i| i.product_id.as_str()).collect();
    assert_eq!(ids, ["mug", "tee"]);
    assert_eq!(summary.item_count, 3);
    assert_eq!(summary.total, Decimal::from(40));

    h.service.remove(&h.user, &sku("mug")).unwrap();
    assert_eq!(h.service.view(&h.user).unwrap().total, Decimal::from(20));

    h.service.clear(&h.user).unwrap();
    let summary = h.service.view(&h.user).unwrap();
    assert!(summary.is_empty());
    assert_eq!(summary.total, Decimal::ZERO);
}

#[test]
fn cloned_services_share_state() {
    let h = TestHarness::new();
    let other = h.service.clone();

    std::thread::scope(|scope| {
        for service in [&h.service, &other] {
            let user = &h.user;
            scope.spawn(move || {
                for _ in 0..20 {
                    service.add_to_cart(user, &sku("tee"), 1).unwrap();
                }
            });
        }
    });

    assert_eq!(h.store.item_count(&h.user).unwrap(), 40);
}
