use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw-material stock record.
///
/// `material_code` is unique among active items; `quantity` never goes
/// negative (enforced by inventory management, which owns mutation).
/// This service only reads items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: Uuid,
    pub material_name: String,
    pub material_code: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_weight_kg: Decimal,
    pub unit_volume_m3: Decimal,
    pub minimum_stock_level: Decimal,
    pub max_stock_level: Decimal,
    pub lot_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub last_restock_date: DateTime<Utc>,
    pub warehouse_zone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A physical storage area with fixed volumetric capacity and a temperature
/// band. Static reference data; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseZone {
    pub zone_code: String,
    pub zone_name: String,
    pub total_capacity_m3: Decimal,
    pub temperature_min_c: Decimal,
    pub temperature_max_c: Decimal,
    pub is_refrigerated: bool,
    pub is_active: bool,
}
