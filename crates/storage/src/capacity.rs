//! Pure aggregations over `(items, zones)`.
//!
//! Everything here is deterministic and IO-free: the read endpoints fetch
//! rows through the store, then derive these views. Cold and warm caches must
//! therefore produce identical aggregates for identical inputs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::item::{StockItem, WarehouseZone};

/// Per-zone volumetric usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCapacity {
    pub zone_code: String,
    pub zone_name: String,
    pub total_capacity_m3: Decimal,
    pub used_capacity_m3: Decimal,
    pub available_capacity_m3: Decimal,
    pub usage_percentage: Decimal,
    pub is_refrigerated: bool,
}

/// Per-category stock rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStock {
    pub category: String,
    pub item_count: usize,
    pub total_quantity: Decimal,
    /// Most frequent unit in the category (lexicographic tie-break).
    /// Quantities are summed across units regardless, so a mixed-unit
    /// category remains a reporting approximation.
    pub primary_unit: String,
    pub total_volume_m3: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

/// Low-stock alert for a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub material_code: String,
    pub material_name: String,
    pub current_quantity: Decimal,
    pub minimum_stock_level: Decimal,
    pub unit: String,
    pub severity: AlertSeverity,
}

/// Full storage summary served by `/storage/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSummary {
    pub total_item_types: usize,
    pub active_item_types: usize,
    pub stock_by_category: Vec<CategoryStock>,
    pub zone_capacities: Vec<ZoneCapacity>,
    pub low_stock_alerts: Vec<LowStockAlert>,
    pub generated_at: DateTime<Utc>,
}

/// Zone breakdown plus workspace totals served by `/storage/available-space`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSpace {
    pub zones: Vec<ZoneCapacity>,
    pub total_capacity_m3: Decimal,
    pub total_used_m3: Decimal,
    pub total_available_m3: Decimal,
    pub overall_usage_percentage: Decimal,
    pub generated_at: DateTime<Utc>,
}

/// An item expiring inside the requested window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringItem {
    pub material_code: String,
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub expiry_date: DateTime<Utc>,
    pub days_remaining: i64,
}

fn usage_percentage(used: Decimal, capacity: Decimal) -> Decimal {
    if capacity.is_zero() {
        Decimal::ZERO
    } else {
        (used / capacity * Decimal::from(100)).round_dp(2)
    }
}

/// Derive used/available volume per zone.
pub fn zone_capacities(items: &[StockItem], zones: &[WarehouseZone]) -> Vec<ZoneCapacity> {
    zones
        .iter()
        .map(|z| {
            let used: Decimal = items
                .iter()
                .filter(|i| i.warehouse_zone == z.zone_code)
                .map(|i| i.quantity * i.unit_volume_m3)
                .sum();
            ZoneCapacity {
                zone_code: z.zone_code.clone(),
                zone_name: z.zone_name.clone(),
                total_capacity_m3: z.total_capacity_m3,
                used_capacity_m3: used,
                available_capacity_m3: z.total_capacity_m3 - used,
                usage_percentage: usage_percentage(used, z.total_capacity_m3),
                is_refrigerated: z.is_refrigerated,
            }
        })
        .collect()
}

/// Group items by category with count, summed quantity and volume.
pub fn category_summary(items: &[StockItem]) -> Vec<CategoryStock> {
    // BTreeMap keeps category order deterministic.
    let mut groups: BTreeMap<&str, Vec<&StockItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category.as_str()).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(category, members)| {
            let mut unit_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for m in &members {
                *unit_counts.entry(m.unit.as_str()).or_default() += 1;
            }
            // Most frequent unit; BTreeMap iteration makes the tie-break
            // the lexicographically smallest unit.
            let primary_unit = unit_counts
                .iter()
                .max_by_key(|(_, count)| **count)
                .map(|(unit, _)| (*unit).to_string())
                .unwrap_or_default();

            CategoryStock {
                category: category.to_string(),
                item_count: members.len(),
                total_quantity: members.iter().map(|m| m.quantity).sum(),
                primary_unit,
                total_volume_m3: members.iter().map(|m| m.quantity * m.unit_volume_m3).sum(),
            }
        })
        .collect()
}

/// Classify low-stock items.
///
/// Critical when `quantity <= minimum`; Warning when
/// `minimum < quantity <= minimum * 1.2`. Critical sorts before Warning,
/// stable otherwise.
pub fn low_stock_alerts(items: &[StockItem]) -> Vec<LowStockAlert> {
    let warning_factor = Decimal::new(12, 1); // 1.2

    let mut alerts: Vec<LowStockAlert> = items
        .iter()
        .filter(|i| i.quantity <= i.minimum_stock_level * warning_factor)
        .map(|i| LowStockAlert {
            material_code: i.material_code.clone(),
            material_name: i.material_name.clone(),
            current_quantity: i.quantity,
            minimum_stock_level: i.minimum_stock_level,
            unit: i.unit.clone(),
            severity: if i.quantity <= i.minimum_stock_level {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            },
        })
        .collect();

    alerts.sort_by_key(|a| a.severity);
    alerts
}

/// Build the full summary view.
pub fn storage_summary(items: &[StockItem], zones: &[WarehouseZone]) -> StorageSummary {
    StorageSummary {
        total_item_types: items.len(),
        active_item_types: items.iter().filter(|i| i.is_active).count(),
        stock_by_category: category_summary(items),
        zone_capacities: zone_capacities(items, zones),
        low_stock_alerts: low_stock_alerts(items),
        generated_at: Utc::now(),
    }
}

/// Build the available-space view.
pub fn available_space(items: &[StockItem], zones: &[WarehouseZone]) -> AvailableSpace {
    let zones = zone_capacities(items, zones);
    let total_capacity: Decimal = zones.iter().map(|z| z.total_capacity_m3).sum();
    let total_used: Decimal = zones.iter().map(|z| z.used_capacity_m3).sum();

    AvailableSpace {
        total_capacity_m3: total_capacity,
        total_used_m3: total_used,
        total_available_m3: total_capacity - total_used,
        overall_usage_percentage: usage_percentage(total_used, total_capacity),
        zones,
        generated_at: Utc::now(),
    }
}

/// Items whose expiry falls inside `now + days_ahead`, ordered by expiry
/// ascending, with whole days remaining (negative when already expired).
pub fn expiring_items(items: &[StockItem], now: DateTime<Utc>, days_ahead: i64) -> Vec<ExpiringItem> {
    let cutoff = now + chrono::Duration::days(days_ahead);

    let mut expiring: Vec<ExpiringItem> = items
        .iter()
        .filter_map(|i| {
            let expiry = i.expiry_date?;
            if expiry > cutoff {
                return None;
            }
            Some(ExpiringItem {
                material_code: i.material_code.clone(),
                material_name: i.material_name.clone(),
                quantity: i.quantity,
                unit: i.unit.clone(),
                expiry_date: expiry,
                days_remaining: (expiry - now).num_days(),
            })
        })
        .collect();

    expiring.sort_by_key(|e| e.expiry_date);
    expiring
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn item(code: &str, category: &str, unit: &str, zone: &str, qty: Decimal, vol: Decimal, min: Decimal) -> StockItem {
        let now = Utc::now();
        StockItem {
            id: Uuid::now_v7(),
            material_name: format!("material {code}"),
            material_code: code.to_string(),
            category: category.to_string(),
            quantity: qty,
            unit: unit.to_string(),
            unit_weight_kg: dec!(1),
            unit_volume_m3: vol,
            minimum_stock_level: min,
            max_stock_level: min * dec!(10),
            lot_number: None,
            expiry_date: None,
            last_restock_date: now,
            warehouse_zone: zone.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn zone(code: &str, capacity: Decimal, refrigerated: bool) -> WarehouseZone {
        WarehouseZone {
            zone_code: code.to_string(),
            zone_name: format!("zone {code}"),
            total_capacity_m3: capacity,
            temperature_min_c: dec!(2),
            temperature_max_c: dec!(8),
            is_refrigerated: refrigerated,
            is_active: true,
        }
    }

    #[test]
    fn zone_usage_sums_matching_items_only() {
        let items = vec![
            item("SUT-001", "Süt", "litre", "A", dec!(12000), dec!(0.001), dec!(5000)),
            item("TUZ-001", "Kimyasal", "kg", "B", dec!(3000), dec!(0.0006), dec!(500)),
        ];
        let zones = vec![zone("A", dec!(500), true), zone("B", dec!(300), false)];

        let caps = zone_capacities(&items, &zones);
        assert_eq!(caps[0].used_capacity_m3, dec!(12.000));
        assert_eq!(caps[0].available_capacity_m3, dec!(488.000));
        assert_eq!(caps[0].usage_percentage, dec!(2.40));
        assert_eq!(caps[1].used_capacity_m3, dec!(1.8000));
    }

    #[test]
    fn zero_capacity_zone_reports_zero_usage_percentage() {
        let items = vec![item("X-001", "Diğer", "adet", "Z", dec!(10), dec!(0.5), dec!(1))];
        let caps = zone_capacities(&items, &[zone("Z", dec!(0), false)]);
        assert_eq!(caps[0].usage_percentage, Decimal::ZERO);
        assert_eq!(caps[0].available_capacity_m3, dec!(-5.0));
    }

    #[test]
    fn low_stock_boundaries() {
        // quantity == min -> Critical
        // quantity == min * 1.2 -> Warning
        // quantity == min * 1.3 -> unflagged
        let items = vec![
            item("A", "c", "kg", "A", dec!(100), dec!(0.1), dec!(100)),
            item("B", "c", "kg", "A", dec!(120), dec!(0.1), dec!(100)),
            item("C", "c", "kg", "A", dec!(130), dec!(0.1), dec!(100)),
        ];

        let alerts = low_stock_alerts(&items);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].material_code, "A");
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[1].material_code, "B");
        assert_eq!(alerts[1].severity, AlertSeverity::Warning);
    }

    #[test]
    fn critical_sorts_before_warning_stable_within_severity() {
        let items = vec![
            item("W1", "c", "kg", "A", dec!(110), dec!(0.1), dec!(100)),
            item("C1", "c", "kg", "A", dec!(90), dec!(0.1), dec!(100)),
            item("W2", "c", "kg", "A", dec!(115), dec!(0.1), dec!(100)),
            item("C2", "c", "kg", "A", dec!(80), dec!(0.1), dec!(100)),
        ];

        let codes: Vec<String> = low_stock_alerts(&items)
            .into_iter()
            .map(|a| a.material_code)
            .collect();
        assert_eq!(codes, vec!["C1", "C2", "W1", "W2"]);
    }

    #[test]
    fn category_summary_picks_most_frequent_unit() {
        let items = vec![
            item("A", "Ambalaj", "adet", "C", dec!(10), dec!(0.01), dec!(1)),
            item("B", "Ambalaj", "adet", "C", dec!(20), dec!(0.01), dec!(1)),
            item("C", "Ambalaj", "kutu", "C", dec!(5), dec!(0.01), dec!(1)),
        ];

        let summary = category_summary(&items);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].item_count, 3);
        assert_eq!(summary[0].primary_unit, "adet");
        assert_eq!(summary[0].total_quantity, dec!(35));
    }

    #[test]
    fn category_summary_unit_tie_breaks_lexicographically() {
        let items = vec![
            item("A", "Diğer", "kg", "B", dec!(1), dec!(0.01), dec!(1)),
            item("B", "Diğer", "adet", "B", dec!(1), dec!(0.01), dec!(1)),
        ];
        assert_eq!(category_summary(&items)[0].primary_unit, "adet");
    }

    #[test]
    fn expiring_window_and_days_remaining() {
        let now = Utc::now();
        let mut near = item("SUT-001", "Süt", "litre", "A", dec!(100), dec!(0.001), dec!(10));
        near.expiry_date = Some(now + Duration::days(3));
        let mut far = item("MAYA-001", "Maya", "kg", "A", dec!(10), dec!(0.001), dec!(1));
        far.expiry_date = Some(now + Duration::days(30));
        let no_expiry = item("TUZ-001", "Kimyasal", "kg", "B", dec!(10), dec!(0.001), dec!(1));

        let result = expiring_items(&[near, far, no_expiry], now, 7);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].material_code, "SUT-001");
        assert_eq!(result[0].days_remaining, 3);
    }

    #[test]
    fn expiring_sorted_by_expiry_ascending() {
        let now = Utc::now();
        let mut later = item("B", "c", "kg", "A", dec!(1), dec!(0.1), dec!(1));
        later.expiry_date = Some(now + Duration::days(5));
        let mut sooner = item("A", "c", "kg", "A", dec!(1), dec!(0.1), dec!(1));
        sooner.expiry_date = Some(now + Duration::days(1));

        let result = expiring_items(&[later, sooner], now, 7);
        assert_eq!(result[0].material_code, "A");
        assert_eq!(result[1].material_code, "B");
    }

    proptest! {
        #[test]
        fn available_space_totals_are_consistent(
            capacities in proptest::collection::vec(0u32..10_000, 1..6),
            quantities in proptest::collection::vec(0u32..1_000, 1..6),
        ) {
            let zones: Vec<WarehouseZone> = capacities
                .iter()
                .enumerate()
                .map(|(idx, c)| zone(&format!("Z{idx}"), Decimal::from(*c), false))
                .collect();
            let items: Vec<StockItem> = quantities
                .iter()
                .enumerate()
                .map(|(idx, q)| {
                    item(
                        &format!("M-{idx}"),
                        "c",
                        "kg",
                        &format!("Z{}", idx % zones.len()),
                        Decimal::from(*q),
                        dec!(0.01),
                        dec!(1),
                    )
                })
                .collect();

            let space = available_space(&items, &zones);
            let zone_used: Decimal = space.zones.iter().map(|z| z.used_capacity_m3).sum();
            prop_assert_eq!(space.total_used_m3, zone_used);
            prop_assert_eq!(
                space.total_available_m3,
                space.total_capacity_m3 - space.total_used_m3
            );
        }
    }
}
