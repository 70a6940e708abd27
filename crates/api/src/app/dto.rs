use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use mandra_core::SupplierId;
use mandra_orders::{NewOrder, NewOrderLine, PurchaseOrder, PurchaseOrderLine};
use mandra_storage::{
    AlertSeverity, AvailableSpace, CategoryStock, ExpiringItem, LowStockAlert, StockItem,
    StorageSummary, ZoneCapacity,
};

// -------------------------
// Request DTOs (wire format is camelCase)
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub material_code: String,
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default)]
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub lines: Vec<OrderLineRequest>,
    pub requested_delivery_date: Option<DateTime<Utc>>,
    pub supplier_id: Option<SupplierId>,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn into_new_order(self) -> NewOrder {
        NewOrder {
            lines: self
                .lines
                .into_iter()
                .map(|l| NewOrderLine {
                    material_code: l.material_code,
                    material_name: l.material_name,
                    quantity: l.quantity,
                    unit: l.unit,
                    unit_price: l.unit_price,
                })
                .collect(),
            requested_delivery_date: self.requested_delivery_date,
            supplier_id: self.supplier_id,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringQuery {
    pub days_ahead: Option<i64>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn stock_item_to_json(item: &StockItem) -> serde_json::Value {
    serde_json::json!({
        "id": item.id,
        "materialName": item.material_name,
        "materialCode": item.material_code,
        "category": item.category,
        "quantity": item.quantity,
        "unit": item.unit,
        "unitWeightKg": item.unit_weight_kg,
        "unitVolumeM3": item.unit_volume_m3,
        "minimumStockLevel": item.minimum_stock_level,
        "maxStockLevel": item.max_stock_level,
        "lotNumber": item.lot_number,
        "expiryDate": item.expiry_date,
        "lastRestockDate": item.last_restock_date,
        "warehouseZone": item.warehouse_zone,
        "isActive": item.is_active,
    })
}

fn severity_str(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Critical => "critical",
        AlertSeverity::Warning => "warning",
    }
}

fn zone_capacity_to_json(zone: &ZoneCapacity) -> serde_json::Value {
    serde_json::json!({
        "zoneCode": zone.zone_code,
        "zoneName": zone.zone_name,
        "totalCapacityM3": zone.total_capacity_m3,
        "usedCapacityM3": zone.used_capacity_m3,
        "availableCapacityM3": zone.available_capacity_m3,
        "usagePercentage": zone.usage_percentage,
        "isRefrigerated": zone.is_refrigerated,
    })
}

fn category_stock_to_json(category: &CategoryStock) -> serde_json::Value {
    serde_json::json!({
        "category": category.category,
        "itemCount": category.item_count,
        "totalQuantity": category.total_quantity,
        "primaryUnit": category.primary_unit,
        "totalVolumeM3": category.total_volume_m3,
    })
}

fn low_stock_alert_to_json(alert: &LowStockAlert) -> serde_json::Value {
    serde_json::json!({
        "materialCode": alert.material_code,
        "materialName": alert.material_name,
        "currentQuantity": alert.current_quantity,
        "minimumStockLevel": alert.minimum_stock_level,
        "unit": alert.unit,
        "severity": severity_str(alert.severity),
    })
}

pub fn storage_summary_to_json(summary: &StorageSummary) -> serde_json::Value {
    serde_json::json!({
        "totalItemTypes": summary.total_item_types,
        "activeItemTypes": summary.active_item_types,
        "stockByCategory": summary.stock_by_category.iter().map(category_stock_to_json).collect::<Vec<_>>(),
        "zoneCapacities": summary.zone_capacities.iter().map(zone_capacity_to_json).collect::<Vec<_>>(),
        "lowStockAlerts": summary.low_stock_alerts.iter().map(low_stock_alert_to_json).collect::<Vec<_>>(),
        "generatedAt": summary.generated_at,
    })
}

pub fn available_space_to_json(space: &AvailableSpace) -> serde_json::Value {
    serde_json::json!({
        "zones": space.zones.iter().map(zone_capacity_to_json).collect::<Vec<_>>(),
        "totalCapacityM3": space.total_capacity_m3,
        "totalUsedM3": space.total_used_m3,
        "totalAvailableM3": space.total_available_m3,
        "overallUsagePercentage": space.overall_usage_percentage,
        "generatedAt": space.generated_at,
    })
}

pub fn expiring_item_to_json(item: &ExpiringItem) -> serde_json::Value {
    serde_json::json!({
        "materialCode": item.material_code,
        "materialName": item.material_name,
        "quantity": item.quantity,
        "unit": item.unit,
        "expiryDate": item.expiry_date,
        "daysRemaining": item.days_remaining,
    })
}

fn order_line_to_json(line: &PurchaseOrderLine) -> serde_json::Value {
    serde_json::json!({
        "id": line.id,
        "materialCode": line.material_code,
        "materialName": line.material_name,
        "quantity": line.quantity,
        "unit": line.unit,
        "unitPrice": line.unit_price,
        "lineTotal": line.line_total,
    })
}

pub fn purchase_order_to_json(order: &PurchaseOrder) -> serde_json::Value {
    serde_json::json!({
        "id": order.id,
        "orderNumber": order.order_number,
        "sourceApplication": order.source_application,
        "status": order.status,
        "supplierId": order.supplier_id,
        "notes": order.notes,
        "requestedDeliveryDate": order.requested_delivery_date,
        "totalAmount": order.total_amount,
        "currency": order.currency,
        "createdAt": order.created_at,
        "lines": order.lines.iter().map(order_line_to_json).collect::<Vec<_>>(),
    })
}
