//! Cache-aside read facade over the storage store.
//!
//! Only the full active-item list is cached (a fixed versioned key with a
//! minutes-scale TTL); the aggregate views are derived from store reads on
//! every call. Correctness never depends on cache presence — a cache error
//! is treated as a miss and logged.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use mandra_core::DomainError;
use mandra_storage::{
    available_space, expiring_items, storage_summary, AvailableSpace, ExpiringItem, StockItem,
    StorageSummary,
};

use crate::cache::Cache;
use crate::store::{StorageStore, StoreError};

const ITEMS_CACHE_KEY: &str = "storage:all_items:v2";
const ITEMS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Default lookahead window for the expiring-items view, in days.
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 7;

pub struct CachedStorageReads {
    store: Arc<dyn StorageStore>,
    cache: Arc<dyn Cache>,
}

impl CachedStorageReads {
    pub fn new(store: Arc<dyn StorageStore>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache }
    }

    fn unavailable(e: StoreError) -> DomainError {
        DomainError::unavailable(e.to_string())
    }

    /// Active items ordered by (category, material_code), cache-aside.
    pub async fn list_active_items(&self) -> Result<Vec<StockItem>, DomainError> {
        match self.cache.get(ITEMS_CACHE_KEY).await {
            Ok(Some(cached)) => match serde_json::from_str::<Vec<StockItem>>(&cached) {
                Ok(items) => {
                    tracing::debug!(key = ITEMS_CACHE_KEY, "cache hit");
                    return Ok(items);
                }
                Err(e) => {
                    tracing::warn!(key = ITEMS_CACHE_KEY, error = %e, "discarding undecodable cache entry");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = ITEMS_CACHE_KEY, error = %e, "cache read failed, falling through to store");
            }
        }

        let items = self
            .store
            .list_active_items()
            .await
            .map_err(Self::unavailable)?;

        match serde_json::to_string(&items) {
            Ok(json) => {
                if let Err(e) = self.cache.set(ITEMS_CACHE_KEY, &json, ITEMS_CACHE_TTL).await {
                    tracing::warn!(key = ITEMS_CACHE_KEY, error = %e, "cache populate failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "item list serialization failed, skipping cache populate"),
        }

        Ok(items)
    }

    /// A single active item by material code (store read, no cache).
    pub async fn item_by_code(&self, material_code: &str) -> Result<Option<StockItem>, DomainError> {
        self.store
            .find_item_by_code(material_code)
            .await
            .map_err(Self::unavailable)
    }

    /// Category/zone/alert rollup.
    pub async fn summary(&self) -> Result<StorageSummary, DomainError> {
        let items = self
            .store
            .list_active_items()
            .await
            .map_err(Self::unavailable)?;
        let zones = self
            .store
            .list_active_zones()
            .await
            .map_err(Self::unavailable)?;
        Ok(storage_summary(&items, &zones))
    }

    /// Zone capacity breakdown with workspace totals.
    pub async fn available_space(&self) -> Result<AvailableSpace, DomainError> {
        let items = self
            .store
            .list_active_items()
            .await
            .map_err(Self::unavailable)?;
        let zones = self
            .store
            .list_active_zones()
            .await
            .map_err(Self::unavailable)?;
        Ok(available_space(&items, &zones))
    }

    /// Items expiring inside the given window (days), expiry ascending.
    pub async fn expiring(&self, days_ahead: i64) -> Result<Vec<ExpiringItem>, DomainError> {
        let items = self
            .store
            .list_active_items()
            .await
            .map_err(Self::unavailable)?;
        Ok(expiring_items(&items, Utc::now(), days_ahead))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::cache::MemoryCache;
    use crate::store::memory::MemoryStorageStore;

    fn item(code: &str, category: &str) -> StockItem {
        let now = Utc::now();
        StockItem {
            id: Uuid::now_v7(),
            material_name: format!("material {code}"),
            material_code: code.to_string(),
            category: category.to_string(),
            quantity: dec!(100),
            unit: "kg".to_string(),
            unit_weight_kg: dec!(1),
            unit_volume_m3: dec!(0.001),
            minimum_stock_level: dec!(10),
            max_stock_level: dec!(1000),
            lot_number: None,
            expiry_date: None,
            last_restock_date: now,
            warehouse_zone: "A".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn reads_with(items: Vec<StockItem>) -> (CachedStorageReads, Arc<MemoryCache>) {
        let store = Arc::new(MemoryStorageStore::new());
        store.seed_items(items);
        let cache = Arc::new(MemoryCache::new());
        (CachedStorageReads::new(store, cache.clone()), cache)
    }

    #[tokio::test]
    async fn miss_populates_cache_and_hit_matches() {
        let (reads, cache) = reads_with(vec![item("TUZ-001", "Kimyasal"), item("SUT-001", "Süt")]);

        let cold = reads.list_active_items().await.unwrap();
        assert!(cache.get(ITEMS_CACHE_KEY).await.unwrap().is_some());

        let warm = reads.list_active_items().await.unwrap();
        assert_eq!(cold, warm);
    }

    #[tokio::test]
    async fn undecodable_cache_entry_falls_through_to_store() {
        let (reads, cache) = reads_with(vec![item("SUT-001", "Süt")]);
        cache
            .set(ITEMS_CACHE_KEY, "not json", ITEMS_CACHE_TTL)
            .await
            .unwrap();

        let items = reads.list_active_items().await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn cold_and_warm_reads_sort_identically() {
        let (reads, cache) = reads_with(vec![
            item("B-002", "Maya"),
            item("A-001", "Süt"),
            item("A-002", "Maya"),
        ]);

        let cold = reads.list_active_items().await.unwrap();
        let codes: Vec<&str> = cold.iter().map(|i| i.material_code.as_str()).collect();
        assert_eq!(codes, vec!["A-002", "B-002", "A-001"]); // (category, code) ascending

        cache.clear();
        let recold = reads.list_active_items().await.unwrap();
        assert_eq!(cold, recold);
    }
}
