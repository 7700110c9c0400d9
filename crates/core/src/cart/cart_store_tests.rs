#[cfg(test)]
mod tests {
    use crate::cart::{CartObserver, CartSnapshot, CartStore, MockCartObserver};
    use crate::catalog::Product;
    use crate::errors::{CartError, Error};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    fn product_a() -> Product {
        Product::new(1, "Atta", dec!(10))
    }

    fn product_b() -> Product {
        Product::new(2, "Bread", dec!(25))
    }

    // ==================== Aggregates ====================

    #[test]
    fn test_totals_for_two_products() {
        let store = CartStore::new();
        store.add(product_a(), 2).unwrap();
        let snapshot = store.add_one(product_b()).unwrap();

        assert_eq!(snapshot.total_items(), 3);
        assert_eq!(snapshot.total_cost(), dec!(45));

        let snapshot = store.set_quantity(1, 0).unwrap();
        assert_eq!(snapshot.entries().len(), 1);
        assert_eq!(snapshot.entries()[0].product.id, 2);
        assert_eq!(snapshot.total_items(), 1);
        assert_eq!(snapshot.total_cost(), dec!(25));
    }

    #[test]
    fn test_add_increments_existing_entry() {
        let store = CartStore::new();
        store.add_one(product_a()).unwrap();
        store.add(product_a(), 4).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.entries().len(), 1);
        assert_eq!(snapshot.quantity_of(1), 5);
        assert_eq!(snapshot.total_cost(), dec!(50));
    }

    #[test]
    fn test_add_refreshes_product_data() {
        let store = CartStore::new();
        store.add_one(product_a()).unwrap();
        store.add_one(Product::new(1, "Atta", dec!(12))).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_cost(), dec!(24));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let store = CartStore::new();
        store.add_one(product_b()).unwrap();
        store.add_one(product_a()).unwrap();
        store.add_one(product_b()).unwrap();

        let ids: Vec<i64> = store.snapshot().entries().iter().map(|e| e.product.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    // ==================== Quantity Edge Cases ====================

    #[test]
    fn test_add_zero_is_rejected() {
        let store = CartStore::new();
        let err = store.add(product_a(), 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Cart(CartError::InvalidQuantity {
                product_id: 1,
                quantity: 0
            })
        ));
        assert!(store.snapshot().is_empty());
        assert_eq!(store.snapshot().revision(), 0);
    }

    #[test]
    fn test_add_overflow_is_rejected() {
        let store = CartStore::new();
        store.add(product_a(), u32::MAX).unwrap();
        assert!(store.add_one(product_a()).is_err());
        assert_eq!(store.quantity_of(1), u32::MAX);
    }

    #[test]
    fn test_set_quantity_zero_twice_is_idempotent() {
        let store = CartStore::new();
        store.add(product_a(), 2).unwrap();
        store.add_one(product_b()).unwrap();

        let first = store.set_quantity(1, 0).unwrap();
        let second = store.set_quantity(1, 0).unwrap();

        assert_eq!(first.entries(), second.entries());
        assert_eq!(second.total_cost(), dec!(25));
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let store = CartStore::new();
        store.add(product_a(), 3).unwrap();
        let snapshot = store.set_quantity(1, -1).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_items(), 0);
    }

    #[test]
    fn test_set_quantity_on_absent_id_is_noop() {
        let store = CartStore::new();
        store.add_one(product_b()).unwrap();
        let before = store.snapshot();

        let after = store.set_quantity(99, 5).unwrap();
        assert_eq!(before.entries(), after.entries());
        assert_eq!(after.quantity_of(99), 0);
    }

    #[test]
    fn test_set_quantity_above_u32_is_rejected() {
        let store = CartStore::new();
        store.add_one(product_a()).unwrap();
        assert!(store.set_quantity(1, i64::from(u32::MAX) + 1).is_err());
        assert_eq!(store.quantity_of(1), 1);
    }

    #[test]
    fn test_clear_empties_cart() {
        let store = CartStore::new();
        store.add(product_a(), 2).unwrap();
        store.add_one(product_b()).unwrap();

        let snapshot = store.clear().unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_items(), 0);
        assert_eq!(snapshot.total_cost(), dec!(0));
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_mutations() {
        let store = CartStore::new();
        store.add(product_a(), 2).unwrap();
        let held = store.snapshot();

        store.clear().unwrap();
        assert_eq!(held.total_items(), 2);
        assert!(store.snapshot().is_empty());
    }

    // ==================== Observers ====================

    #[test]
    fn test_observer_notified_once_per_mutation_in_order() {
        let store = CartStore::new();
        let observer = MockCartObserver::new();
        store.subscribe(Arc::new(observer.clone()));

        store.add_one(product_a()).unwrap();
        store.set_quantity(1, 3).unwrap();
        store.set_quantity(42, 1).unwrap();
        store.clear().unwrap();

        assert_eq!(observer.revisions(), vec![1, 2, 3, 4]);
        let snapshots = observer.snapshots();
        assert_eq!(snapshots[1].total_items(), 3);
        assert!(snapshots[3].is_empty());
    }

    #[test]
    fn test_rejected_mutation_notifies_nobody() {
        let store = CartStore::new();
        let observer = MockCartObserver::new();
        store.subscribe(Arc::new(observer.clone()));

        assert!(store.add(product_a(), 0).is_err());
        assert!(observer.is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = CartStore::new();
        let observer = MockCartObserver::new();
        let id = store.subscribe(Arc::new(observer.clone()));

        store.add_one(product_a()).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add_one(product_a()).unwrap();

        assert_eq!(observer.len(), 1);
    }

    /// Observer that reads the store from inside the callback.
    struct ReadingObserver {
        store: Arc<CartStore>,
        seen: Mutex<Vec<(u64, u64)>>,
    }

    impl CartObserver for ReadingObserver {
        fn on_cart_changed(&self, snapshot: &CartSnapshot) {
            let current = self.store.snapshot();
            self.seen
                .lock()
                .unwrap()
                .push((snapshot.revision(), current.revision()));
        }
    }

    #[test]
    fn test_observer_sees_aggregates_already_updated() {
        let store = Arc::new(CartStore::new());
        let observer = Arc::new(ReadingObserver {
            store: Arc::clone(&store),
            seen: Mutex::new(Vec::new()),
        });
        store.subscribe(observer.clone());

        store.add(product_a(), 2).unwrap();
        store.add_one(product_b()).unwrap();

        let seen = observer.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, 1), (2, 2)]);
    }
}
