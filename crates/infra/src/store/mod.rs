//! Store traits and their errors.
//!
//! Every store ships two implementations: an in-memory one for dev/test and a
//! Postgres one for production, selected at wiring time. Traits keep the
//! service layer independent of the backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mandra_core::{AuditEntry, ClientId, OrderId};
use mandra_orders::PurchaseOrder;
use mandra_storage::{StockItem, WarehouseZone};

pub mod memory;
pub mod postgres;

/// Transport-level store failure.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure modes of the transactional order insert.
#[derive(Debug, Error)]
pub enum OrderInsertError {
    /// The generated order number already exists; the caller regenerates and
    /// retries (bounded).
    #[error("order number already exists")]
    DuplicateOrderNumber,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Provisioned API client row, as stored.
///
/// `allowed_scopes` is the raw comma-separated grant string; scope parsing
/// happens in the resolver so both store backends stay dumb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub client_name: String,
    pub api_key_hash: String,
    pub allowed_scopes: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Read access to stock items and zones.
#[async_trait]
pub trait StorageStore: Send + Sync {
    /// Active items ordered by (category, material_code) ascending.
    async fn list_active_items(&self) -> Result<Vec<StockItem>, StoreError>;

    /// A single active item by material code.
    async fn find_item_by_code(&self, material_code: &str) -> Result<Option<StockItem>, StoreError>;

    /// Active zones.
    async fn list_active_zones(&self) -> Result<Vec<WarehouseZone>, StoreError>;
}

/// Purchase order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist header and all lines atomically. No partial state is ever
    /// visible to a reader, whatever fails.
    async fn insert_order(&self, order: &PurchaseOrder) -> Result<(), OrderInsertError>;

    /// Committed order with lines loaded eagerly.
    async fn get_order(&self, id: OrderId) -> Result<Option<PurchaseOrder>, StoreError>;

    /// Committed orders of one source, created_at descending, lines eager.
    async fn list_orders_by_source(
        &self,
        source_application: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PurchaseOrder>, StoreError>;
}

/// Provisioned client lookup.
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn find_by_key_hash(&self, api_key_hash: &str) -> Result<Option<ClientRecord>, StoreError>;
}

/// Append-only audit sink.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError>;
}
