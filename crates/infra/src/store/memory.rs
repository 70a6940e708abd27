//! In-memory store implementations (dev/test).
//!
//! These enforce the same constraints the relational schema does — most
//! importantly the order-number uniqueness gate — so the retry/conflict
//! paths behave identically against both backends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use mandra_core::{AuditEntry, OrderId};
use mandra_orders::PurchaseOrder;
use mandra_storage::{StockItem, WarehouseZone};

use super::{AuditStore, ClientRecord, ClientStore, OrderInsertError, OrderStore, StorageStore, StoreError};

/// In-memory stock/zone store.
#[derive(Debug, Default)]
pub struct MemoryStorageStore {
    items: RwLock<Vec<StockItem>>,
    zones: RwLock<Vec<WarehouseZone>>,
}

impl MemoryStorageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_items(&self, items: Vec<StockItem>) {
        self.items.write().unwrap().extend(items);
    }

    pub fn seed_zones(&self, zones: Vec<WarehouseZone>) {
        self.zones.write().unwrap().extend(zones);
    }
}

#[async_trait]
impl StorageStore for MemoryStorageStore {
    async fn list_active_items(&self) -> Result<Vec<StockItem>, StoreError> {
        let mut items: Vec<StockItem> = self
            .items
            .read()
            .unwrap()
            .iter()
            .filter(|i| i.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.material_code.cmp(&b.material_code))
        });
        Ok(items)
    }

    async fn find_item_by_code(&self, material_code: &str) -> Result<Option<StockItem>, StoreError> {
        Ok(self
            .items
            .read()
            .unwrap()
            .iter()
            .find(|i| i.is_active && i.material_code == material_code)
            .cloned())
    }

    async fn list_active_zones(&self) -> Result<Vec<WarehouseZone>, StoreError> {
        Ok(self
            .zones
            .read()
            .unwrap()
            .iter()
            .filter(|z| z.is_active)
            .cloned()
            .collect())
    }
}

/// In-memory order store with the order-number uniqueness gate.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<PurchaseOrder>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of committed orders (test inspection).
    pub fn order_count(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    /// Whether any committed order carries a line with the given material
    /// code (test inspection of rejection atomicity).
    pub fn has_line_with_code(&self, material_code: &str) -> bool {
        self.orders
            .read()
            .unwrap()
            .iter()
            .any(|o| o.lines.iter().any(|l| l.material_code == material_code))
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert_order(&self, order: &PurchaseOrder) -> Result<(), OrderInsertError> {
        let mut orders = self.orders.write().unwrap();
        if orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(OrderInsertError::DuplicateOrderNumber);
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<PurchaseOrder>, StoreError> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn list_orders_by_source(
        &self,
        source_application: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PurchaseOrder>, StoreError> {
        let mut orders: Vec<PurchaseOrder> = self
            .orders
            .read()
            .unwrap()
            .iter()
            .filter(|o| o.source_application == source_application)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// In-memory provisioned-client store.
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    clients: RwLock<Vec<ClientRecord>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_client(&self, record: ClientRecord) {
        self.clients.write().unwrap().push(record);
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn find_by_key_hash(&self, api_key_hash: &str) -> Result<Option<ClientRecord>, StoreError> {
        Ok(self
            .clients
            .read()
            .unwrap()
            .iter()
            .find(|c| c.api_key_hash == api_key_hash)
            .cloned())
    }
}

/// In-memory audit sink.
///
/// `fail_appends` lets tests exercise the recorder's swallow-everything
/// contract.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditEntry>>,
    fail_appends: AtomicBool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().unwrap().clone()
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("audit store down".to_string()));
        }
        self.entries.write().unwrap().push(entry.clone());
        Ok(())
    }
}
