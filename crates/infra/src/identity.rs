//! Credential resolution against the provisioning store.
//!
//! The resolver is the sole identity authority for both the read and write
//! paths. Identities are looked up at request time; there is no in-process
//! identity cache.

use std::sync::Arc;

use mandra_auth::{hash_api_key, parse_scopes, ClientIdentity};
use mandra_core::DomainError;

use crate::store::ClientStore;

pub struct IdentityResolver {
    clients: Arc<dyn ClientStore>,
}

impl IdentityResolver {
    pub fn new(clients: Arc<dyn ClientStore>) -> Self {
        Self { clients }
    }

    /// Resolve a raw credential to a client identity.
    ///
    /// The raw key is digested and looked up by hash; it is never stored,
    /// logged, or compared directly. Unknown hash or inactive record both
    /// resolve to `Unauthorized` — scope denial (`Forbidden`) happens later,
    /// against the resolved identity.
    pub async fn resolve(&self, raw_api_key: &str) -> Result<ClientIdentity, DomainError> {
        let hash = hash_api_key(raw_api_key);

        let record = self
            .clients
            .find_by_key_hash(&hash)
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        match record {
            Some(record) if record.is_active => Ok(ClientIdentity::new(
                record.id,
                record.client_name,
                parse_scopes(&record.allowed_scopes),
            )),
            _ => Err(DomainError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mandra_auth::Scope;
    use mandra_core::ClientId;

    use crate::store::memory::MemoryClientStore;
    use crate::store::ClientRecord;

    fn seeded_resolver(is_active: bool) -> (IdentityResolver, &'static str) {
        let raw_key = "mpk_web_2025_test";
        let store = Arc::new(MemoryClientStore::new());
        store.seed_client(ClientRecord {
            id: ClientId::new(),
            client_name: "WebPortal".to_string(),
            api_key_hash: hash_api_key(raw_key),
            allowed_scopes: "storage:read,orders:write,orders:read".to_string(),
            is_active,
            created_at: Utc::now(),
        });
        (IdentityResolver::new(store), raw_key)
    }

    #[tokio::test]
    async fn resolves_active_client_with_scopes() {
        let (resolver, raw_key) = seeded_resolver(true);
        let client = resolver.resolve(raw_key).await.unwrap();
        assert_eq!(client.name, "WebPortal");
        assert!(client.has_scope(&Scope::new("orders:write")));
        assert!(!client.has_scope(&Scope::new("admin:all")));
    }

    #[tokio::test]
    async fn unknown_key_is_unauthorized() {
        let (resolver, _) = seeded_resolver(true);
        let err = resolver.resolve("mpk_unknown").await.unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
    }

    #[tokio::test]
    async fn inactive_client_is_unauthorized() {
        let (resolver, raw_key) = seeded_resolver(false);
        let err = resolver.resolve(raw_key).await.unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
    }
}
