//! Postgres store implementations (sqlx).
//!
//! The order insert wraps header and lines in one transaction; the unique
//! index on `order_number` is the concurrency gate, surfaced to the caller
//! as `DuplicateOrderNumber` so it can regenerate and retry.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use mandra_core::{AuditEntry, ClientId, LineId, OrderId, SupplierId};
use mandra_orders::{OrderStatus, PurchaseOrder, PurchaseOrderLine};
use mandra_storage::{StockItem, WarehouseZone};

use super::{AuditStore, ClientRecord, ClientStore, OrderInsertError, OrderStore, StorageStore, StoreError};

const PG_UNIQUE_VIOLATION: &str = "23505";

fn store_err(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn map_insert_err(e: sqlx::Error) -> OrderInsertError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
            return OrderInsertError::DuplicateOrderNumber;
        }
    }
    OrderInsertError::Store(store_err(e))
}

/// Postgres-backed stock/zone store.
pub struct PostgresStorageStore {
    pool: PgPool,
}

impl PostgresStorageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_item(row: &PgRow) -> Result<StockItem, sqlx::Error> {
    Ok(StockItem {
        id: row.try_get::<Uuid, _>("id")?,
        material_name: row.try_get("material_name")?,
        material_code: row.try_get("material_code")?,
        category: row.try_get("category")?,
        quantity: row.try_get::<Decimal, _>("quantity")?,
        unit: row.try_get("unit")?,
        unit_weight_kg: row.try_get::<Decimal, _>("unit_weight_kg")?,
        unit_volume_m3: row.try_get::<Decimal, _>("unit_volume_m3")?,
        minimum_stock_level: row.try_get::<Decimal, _>("minimum_stock_level")?,
        max_stock_level: row.try_get::<Decimal, _>("max_stock_level")?,
        lot_number: row.try_get::<Option<String>, _>("lot_number")?,
        expiry_date: row.try_get::<Option<DateTime<Utc>>, _>("expiry_date")?,
        last_restock_date: row.try_get::<DateTime<Utc>, _>("last_restock_date")?,
        warehouse_zone: row.try_get("warehouse_zone")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

const ITEM_COLUMNS: &str = "id, material_name, material_code, category, quantity, unit, \
     unit_weight_kg, unit_volume_m3, minimum_stock_level, max_stock_level, \
     lot_number, expiry_date, last_restock_date, warehouse_zone, is_active, \
     created_at, updated_at";

#[async_trait]
impl StorageStore for PostgresStorageStore {
    async fn list_active_items(&self) -> Result<Vec<StockItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM storage_items \
             WHERE is_active ORDER BY category, material_code"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(row_to_item).collect::<Result<_, _>>().map_err(store_err)
    }

    async fn find_item_by_code(&self, material_code: &str) -> Result<Option<StockItem>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM storage_items \
             WHERE is_active AND material_code = $1"
        ))
        .bind(material_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(row_to_item).transpose().map_err(store_err)
    }

    async fn list_active_zones(&self) -> Result<Vec<WarehouseZone>, StoreError> {
        let rows = sqlx::query(
            "SELECT zone_code, zone_name, total_capacity_m3, temperature_min_c, \
             temperature_max_c, is_refrigerated, is_active \
             FROM warehouse_zones WHERE is_active ORDER BY zone_code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                Ok(WarehouseZone {
                    zone_code: row.try_get("zone_code")?,
                    zone_name: row.try_get("zone_name")?,
                    total_capacity_m3: row.try_get::<Decimal, _>("total_capacity_m3")?,
                    temperature_min_c: row.try_get::<Decimal, _>("temperature_min_c")?,
                    temperature_max_c: row.try_get::<Decimal, _>("temperature_max_c")?,
                    is_refrigerated: row.try_get("is_refrigerated")?,
                    is_active: row.try_get("is_active")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(store_err)
    }
}

/// Postgres-backed purchase order store.
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_lines(&self, order_id: OrderId) -> Result<Vec<PurchaseOrderLine>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, order_id, material_code, material_name, quantity, unit, \
             unit_price, line_total \
             FROM purchase_order_lines WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                Ok(PurchaseOrderLine {
                    id: LineId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
                    material_code: row.try_get("material_code")?,
                    material_name: row.try_get("material_name")?,
                    quantity: row.try_get::<Decimal, _>("quantity")?,
                    unit: row.try_get("unit")?,
                    unit_price: row.try_get::<Decimal, _>("unit_price")?,
                    line_total: row.try_get::<Decimal, _>("line_total")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(store_err)
    }
}

fn row_to_order_header(row: &PgRow) -> Result<PurchaseOrder, sqlx::Error> {
    let status_text: String = row.try_get("status")?;
    let status = OrderStatus::from_str(&status_text)
        .map_err(|e| sqlx::Error::Decode(e.to_string().into()))?;

    Ok(PurchaseOrder {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        order_number: row.try_get("order_number")?,
        source_application: row.try_get("source_application")?,
        status,
        supplier_id: row
            .try_get::<Option<Uuid>, _>("supplier_id")?
            .map(SupplierId::from_uuid),
        notes: row.try_get::<Option<String>, _>("notes")?,
        requested_delivery_date: row.try_get::<Option<DateTime<Utc>>, _>("requested_delivery_date")?,
        total_amount: row.try_get::<Decimal, _>("total_amount")?,
        currency: row.try_get("currency")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        lines: Vec::new(),
    })
}

const ORDER_COLUMNS: &str = "id, order_number, source_application, status, supplier_id, notes, \
     requested_delivery_date, total_amount, currency, created_at, updated_at";

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert_order(&self, order: &PurchaseOrder) -> Result<(), OrderInsertError> {
        let mut tx = self.pool.begin().await.map_err(|e| OrderInsertError::Store(store_err(e)))?;

        sqlx::query(
            "INSERT INTO purchase_orders \
             (id, order_number, source_application, status, supplier_id, notes, \
              requested_delivery_date, total_amount, currency, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(&order.source_application)
        .bind(order.status.as_str())
        .bind(order.supplier_id.map(|s| *s.as_uuid()))
        .bind(&order.notes)
        .bind(order.requested_delivery_date)
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_err)?;

        for line in &order.lines {
            sqlx::query(
                "INSERT INTO purchase_order_lines \
                 (id, order_id, material_code, material_name, quantity, unit, unit_price, line_total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(line.id.as_uuid())
            .bind(line.order_id.as_uuid())
            .bind(&line.material_code)
            .bind(&line.material_name)
            .bind(line.quantity)
            .bind(&line.unit)
            .bind(line.unit_price)
            .bind(line.line_total)
            .execute(&mut *tx)
            .await
            .map_err(|e| OrderInsertError::Store(store_err(e)))?;
        }

        // Rollback on drop covers every early return above.
        tx.commit().await.map_err(map_insert_err)?;
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<PurchaseOrder>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut order = row_to_order_header(&row).map_err(store_err)?;
        order.lines = self.load_lines(order.id).await?;
        Ok(Some(order))
    }

    async fn list_orders_by_source(
        &self,
        source_application: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PurchaseOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM purchase_orders \
             WHERE source_application = $1 \
             ORDER BY created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(source_application)
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut order = row_to_order_header(row).map_err(store_err)?;
            order.lines = self.load_lines(order.id).await?;
            orders.push(order);
        }
        Ok(orders)
    }
}

/// Postgres-backed provisioned-client store.
pub struct PostgresClientStore {
    pool: PgPool,
}

impl PostgresClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PostgresClientStore {
    async fn find_by_key_hash(&self, api_key_hash: &str) -> Result<Option<ClientRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, client_name, api_key_hash, allowed_scopes, is_active, created_at \
             FROM api_clients WHERE api_key_hash = $1",
        )
        .bind(api_key_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(|row| {
            Ok(ClientRecord {
                id: ClientId::from_uuid(row.try_get::<Uuid, _>("id")?),
                client_name: row.try_get("client_name")?,
                api_key_hash: row.try_get("api_key_hash")?,
                allowed_scopes: row.try_get("allowed_scopes")?,
                is_active: row.try_get("is_active")?,
                created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            })
        })
        .transpose()
        .map_err(store_err)
    }
}

/// Postgres-backed audit sink (append-only).
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO audit_logs \
             (timestamp, client_name, http_method, path, status_code, duration_ms, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.timestamp)
        .bind(&entry.client_name)
        .bind(&entry.http_method)
        .bind(&entry.path)
        .bind(i32::from(entry.status_code))
        .bind(entry.duration_ms)
        .bind(&entry.ip_address)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }
}
