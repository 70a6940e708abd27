//! Infrastructure wiring: stores, cache, resolver, order manager, notifier.
//!
//! Dev/test runs get in-memory stores; production sets
//! `USE_PERSISTENT_STORES=true` for Postgres (and, with the `redis` feature,
//! a Redis cache).

use std::sync::Arc;

use mandra_infra::{
    notify::NoopNotifier,
    store::memory::{MemoryAuditStore, MemoryClientStore, MemoryOrderStore, MemoryStorageStore},
    store::postgres::{
        PostgresAuditStore, PostgresClientStore, PostgresOrderStore, PostgresStorageStore,
    },
    AuditRecorder, AuditStore, Cache, CachedStorageReads, ClientStore, IdentityResolver,
    MemoryCache, NewOrderNotifier, NotifierConfig, OrderManager, OrderStore, StorageStore,
    SupplierNotifier,
};

pub struct AppServices {
    pub reads: CachedStorageReads,
    pub orders: OrderManager,
    pub resolver: IdentityResolver,
    pub audit: AuditRecorder,
}

impl AppServices {
    /// Wire services from concrete store/cache/notifier implementations.
    pub fn wire(
        storage: Arc<dyn StorageStore>,
        orders: Arc<dyn OrderStore>,
        clients: Arc<dyn ClientStore>,
        audit: Arc<dyn AuditStore>,
        cache: Arc<dyn Cache>,
        notifier: Arc<dyn NewOrderNotifier>,
    ) -> Self {
        Self {
            reads: CachedStorageReads::new(storage, cache),
            orders: OrderManager::new(orders, notifier),
            resolver: IdentityResolver::new(clients),
            audit: AuditRecorder::new(audit),
        }
    }
}

pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        build_persistent_services().await
    } else {
        tracing::warn!("USE_PERSISTENT_STORES not set; using empty in-memory stores");
        build_in_memory_services()
    }
}

fn build_in_memory_services() -> AppServices {
    AppServices::wire(
        Arc::new(MemoryStorageStore::new()),
        Arc::new(MemoryOrderStore::new()),
        Arc::new(MemoryClientStore::new()),
        Arc::new(MemoryAuditStore::new()),
        Arc::new(MemoryCache::new()),
        notifier_from_env(),
    )
}

async fn build_persistent_services() -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");

    AppServices::wire(
        Arc::new(PostgresStorageStore::new(pool.clone())),
        Arc::new(PostgresOrderStore::new(pool.clone())),
        Arc::new(PostgresClientStore::new(pool.clone())),
        Arc::new(PostgresAuditStore::new(pool)),
        cache_from_env(),
        notifier_from_env(),
    )
}

#[cfg(feature = "redis")]
fn cache_from_env() -> Arc<dyn Cache> {
    use mandra_infra::cache::redis::RedisCache;

    match std::env::var("REDIS_URL") {
        Ok(redis_url) => match RedisCache::new(&redis_url, "mandra:") {
            Ok(cache) => return Arc::new(cache),
            Err(e) => tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory cache"),
        },
        Err(_) => tracing::warn!("REDIS_URL not set, falling back to in-memory cache"),
    }
    Arc::new(MemoryCache::new())
}

#[cfg(not(feature = "redis"))]
fn cache_from_env() -> Arc<dyn Cache> {
    Arc::new(MemoryCache::new())
}

fn notifier_from_env() -> Arc<dyn NewOrderNotifier> {
    let Ok(endpoint) = std::env::var("SUPPLIER_WEBHOOK_URL") else {
        tracing::warn!("SUPPLIER_WEBHOOK_URL not set; supplier notifications disabled");
        return Arc::new(NoopNotifier);
    };

    let secret = std::env::var("SUPPLIER_WEBHOOK_SECRET").unwrap_or_else(|_| {
        tracing::warn!("SUPPLIER_WEBHOOK_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    Arc::new(SupplierNotifier::new(NotifierConfig {
        endpoint,
        secret,
        ..NotifierConfig::default()
    }))
}
