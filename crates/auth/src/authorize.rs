use thiserror::Error;

use crate::{ClientIdentity, Scope};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing scope '{0}'")]
    Forbidden(String),
}

/// Check that a resolved client holds the required scope.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn require_scope(client: &ClientIdentity, required: &Scope) -> Result<(), AuthzError> {
    if client.has_scope(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandra_core::ClientId;

    fn client(scopes: &[&'static str]) -> ClientIdentity {
        ClientIdentity::new(
            ClientId::new(),
            "WebPortal",
            scopes.iter().map(|s| Scope::new(*s)).collect(),
        )
    }

    #[test]
    fn grants_when_scope_present() {
        let c = client(&["storage:read", "orders:write"]);
        assert!(require_scope(&c, &Scope::new("orders:write")).is_ok());
    }

    #[test]
    fn wildcard_grants_everything() {
        let c = client(&["*"]);
        assert!(require_scope(&c, &Scope::new("orders:write")).is_ok());
    }

    #[test]
    fn denies_missing_scope() {
        let c = client(&["storage:read"]);
        let err = require_scope(&c, &Scope::new("orders:write")).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("orders:write".to_string()));
    }
}
