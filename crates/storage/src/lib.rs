//! `mandra-storage` — warehouse stock domain: items, zones, and the pure
//! capacity/stock aggregations served by the read endpoints.

pub mod capacity;
pub mod item;

pub use capacity::{
    available_space, category_summary, expiring_items, low_stock_alerts, storage_summary,
    zone_capacities, AlertSeverity, AvailableSpace, CategoryStock, ExpiringItem, LowStockAlert,
    StorageSummary, ZoneCapacity,
};
pub use item::{StockItem, WarehouseZone};
