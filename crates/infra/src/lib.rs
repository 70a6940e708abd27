//! `mandra-infra` — stores and side-effect adapters.
//!
//! Store traits with in-memory (dev/test) and Postgres implementations, the
//! TTL cache, the identity resolver, the cache-aside read store, the order
//! transaction manager, the supplier webhook notifier, and the audit
//! recorder. The durable store is the single source of truth; the cache is
//! never authoritative.

pub mod audit;
pub mod cache;
pub mod identity;
pub mod notify;
pub mod order_manager;
pub mod read_store;
pub mod store;

pub use audit::AuditRecorder;
pub use cache::{Cache, MemoryCache};
pub use identity::IdentityResolver;
pub use notify::{NewOrderNotifier, NotifierConfig, SupplierNotifier};
pub use order_manager::OrderManager;
pub use read_store::CachedStorageReads;
pub use store::{AuditStore, ClientRecord, ClientStore, OrderInsertError, OrderStore, StorageStore, StoreError};
