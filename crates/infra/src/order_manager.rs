//! Transactional purchase-order manager.
//!
//! Validates, numbers, persists (atomically, via the store), and hands the
//! committed order id to the notifier on a detached path. The store's unique
//! constraint on the order number is the concurrency gate; on collision the
//! number is regenerated a bounded number of times.

use std::sync::Arc;

use chrono::Utc;

use mandra_auth::ClientIdentity;
use mandra_core::{DomainError, OrderId};
use mandra_orders::{build_order, generate_order_number, validate_lines, NewOrder, PurchaseOrder};

use crate::notify::NewOrderNotifier;
use crate::store::{OrderInsertError, OrderStore};

const MAX_NUMBER_ATTEMPTS: u32 = 5;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct OrderManager {
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn NewOrderNotifier>,
}

impl OrderManager {
    pub fn new(store: Arc<dyn OrderStore>, notifier: Arc<dyn NewOrderNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Create and commit a new order for the calling client.
    ///
    /// Business-rule preconditions are re-validated here regardless of what
    /// the HTTP layer already checked. On commit the notifier handoff is
    /// detached — its failure can never undo the order.
    pub async fn create_order(
        &self,
        request: &NewOrder,
        source: &ClientIdentity,
    ) -> Result<PurchaseOrder, DomainError> {
        validate_lines(&request.lines)?;

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let now = Utc::now();
            let order_number = generate_order_number(&source.name, now);
            let order = build_order(request, order_number, &source.name, now)?;

            match self.store.insert_order(&order).await {
                Ok(()) => {
                    tracing::info!(
                        order_number = %order.order_number,
                        source = %source.name,
                        total_amount = %order.total_amount,
                        currency = %order.currency,
                        "purchase order created"
                    );
                    self.notifier.notify_new_order(order.id);
                    return Ok(order);
                }
                Err(OrderInsertError::DuplicateOrderNumber) => {
                    tracing::warn!(attempt, source = %source.name, "order number collision, regenerating");
                }
                Err(OrderInsertError::Store(e)) => {
                    return Err(DomainError::unavailable(e.to_string()));
                }
            }
        }

        Err(DomainError::conflict(
            "order number generation exhausted retries",
        ))
    }

    /// Committed order by id, lines eager.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<PurchaseOrder>, DomainError> {
        self.store
            .get_order(id)
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))
    }

    /// Orders of one source, newest first. `page` is 1-based and coerced up
    /// to 1; `page_size` is clamped to `[1, 100]` (default 20). Returns the
    /// effective `(page, page_size, orders)`.
    pub async fn list_orders_by_source(
        &self,
        source_application: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<(u32, u32, Vec<PurchaseOrder>), DomainError> {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = u64::from(page - 1) * u64::from(page_size);

        let orders = self
            .store
            .list_orders_by_source(source_application, offset, u64::from(page_size))
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        Ok((page, page_size, orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use mandra_auth::Scope;
    use mandra_core::ClientId;
    use mandra_orders::NewOrderLine;

    use crate::store::memory::MemoryOrderStore;
    use crate::store::StoreError;

    #[derive(Default)]
    struct RecordingNotifier {
        ids: Mutex<Vec<OrderId>>,
    }

    impl NewOrderNotifier for RecordingNotifier {
        fn notify_new_order(&self, order_id: OrderId) {
            self.ids.lock().unwrap().push(order_id);
        }
    }

    /// Returns `DuplicateOrderNumber` for the first `failures` inserts, then
    /// delegates to a real in-memory store.
    struct CollidingOrderStore {
        inner: MemoryOrderStore,
        remaining_failures: AtomicU32,
    }

    impl CollidingOrderStore {
        fn new(failures: u32) -> Self {
            Self {
                inner: MemoryOrderStore::new(),
                remaining_failures: AtomicU32::new(failures),
            }
        }
    }

    #[async_trait]
    impl OrderStore for CollidingOrderStore {
        async fn insert_order(&self, order: &PurchaseOrder) -> Result<(), OrderInsertError> {
            if self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(OrderInsertError::DuplicateOrderNumber);
            }
            self.inner.insert_order(order).await
        }

        async fn get_order(&self, id: OrderId) -> Result<Option<PurchaseOrder>, StoreError> {
            self.inner.get_order(id).await
        }

        async fn list_orders_by_source(
            &self,
            source_application: &str,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<PurchaseOrder>, StoreError> {
            self.inner
                .list_orders_by_source(source_application, offset, limit)
                .await
        }
    }

    fn client(name: &str) -> ClientIdentity {
        ClientIdentity::new(
            ClientId::new(),
            name,
            vec![Scope::new("orders:write"), Scope::new("orders:read")],
        )
    }

    fn one_line_request() -> NewOrder {
        NewOrder {
            lines: vec![NewOrderLine {
                material_code: "SUT-001".to_string(),
                material_name: "Çiğ İnek Sütü".to_string(),
                quantity: dec!(100),
                unit: "litre".to_string(),
                unit_price: dec!(28.5),
            }],
            requested_delivery_date: None,
            supplier_id: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn commits_order_and_hands_off_notification() {
        let store = Arc::new(MemoryOrderStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OrderManager::new(store.clone(), notifier.clone());

        let order = manager
            .create_order(&one_line_request(), &client("MobilApp"))
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec!(2850.00));
        assert!(order.order_number.starts_with("PO-MOB-"));
        assert_eq!(store.order_count(), 1);
        assert_eq!(notifier.ids.lock().unwrap().as_slice(), &[order.id]);
    }

    #[tokio::test]
    async fn invalid_request_commits_nothing_and_notifies_nobody() {
        let store = Arc::new(MemoryOrderStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OrderManager::new(store.clone(), notifier.clone());

        let mut request = one_line_request();
        request.lines[0].quantity = dec!(0);

        let err = manager
            .create_order(&request, &client("MobilApp"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
        assert_eq!(store.order_count(), 0);
        assert!(notifier.ids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn retries_through_number_collisions() {
        let store = Arc::new(CollidingOrderStore::new(2));
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OrderManager::new(store.clone(), notifier);

        let order = manager
            .create_order(&one_line_request(), &client("WebPortal"))
            .await
            .unwrap();
        assert!(order.order_number.starts_with("PO-WEB-"));
        assert_eq!(store.inner.order_count(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_conflict() {
        let store = Arc::new(CollidingOrderStore::new(u32::MAX));
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OrderManager::new(store.clone(), notifier.clone());

        let err = manager
            .create_order(&one_line_request(), &client("WebPortal"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(notifier.ids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_clamps_page_and_page_size() {
        let store = Arc::new(MemoryOrderStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OrderManager::new(store, notifier);

        let (page, page_size, _) = manager
            .list_orders_by_source("MobilApp", Some(0), Some(500))
            .await
            .unwrap();
        assert_eq!(page, 1);
        assert_eq!(page_size, 100);

        let (page, page_size, _) = manager
            .list_orders_by_source("MobilApp", None, None)
            .await
            .unwrap();
        assert_eq!(page, 1);
        assert_eq!(page_size, 20);
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_source() {
        let store = Arc::new(MemoryOrderStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OrderManager::new(store, notifier);

        manager
            .create_order(&one_line_request(), &client("MobilApp"))
            .await
            .unwrap();
        manager
            .create_order(&one_line_request(), &client("WebPortal"))
            .await
            .unwrap();

        let (_, _, mobile) = manager
            .list_orders_by_source("MobilApp", None, None)
            .await
            .unwrap();
        assert_eq!(mobile.len(), 1);
        assert_eq!(mobile[0].source_application, "MobilApp");
    }
}
