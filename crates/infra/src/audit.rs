//! Audit recorder.

use std::sync::Arc;

use mandra_core::AuditEntry;

use crate::store::AuditStore;

/// Appends one audit entry per request outcome.
///
/// Never surfaces an error: audit logging must not be able to turn a
/// successful business operation into a failed response.
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.store.append(&entry).await {
            tracing::debug!(error = %e, path = %entry.path, "audit append failed, dropping entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::memory::MemoryAuditStore;

    fn entry(path: &str, status: u16) -> AuditEntry {
        AuditEntry::new(
            Some("WebPortal".to_string()),
            "GET",
            path,
            status,
            12,
            Some("10.0.0.7".to_string()),
        )
    }

    #[tokio::test]
    async fn appends_one_entry_per_call() {
        let store = Arc::new(MemoryAuditStore::new());
        let recorder = AuditRecorder::new(store.clone());

        recorder.record(entry("/storage/items", 200)).await;
        recorder.record(entry("/orders", 201)).await;

        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/storage/items");
        assert_eq!(entries[1].status_code, 201);
    }

    #[tokio::test]
    async fn store_failure_is_swallowed() {
        let store = Arc::new(MemoryAuditStore::new());
        store.set_fail_appends(true);
        let recorder = AuditRecorder::new(store.clone());

        recorder.record(entry("/orders", 201)).await;
        assert!(store.entries().is_empty());
    }
}
