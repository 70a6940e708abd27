use serde::{Deserialize, Serialize};

use mandra_core::ClientId;

use crate::scope::Scope;

/// A resolved API client identity (calling application).
///
/// Provisioned out of band; read-only inside this service. The raw credential
/// never appears here — only its digest is stored, and resolution happens by
/// digest lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub id: ClientId,
    pub name: String,
    pub scopes: Vec<Scope>,
}

impl ClientIdentity {
    pub fn new(id: ClientId, name: impl Into<String>, scopes: Vec<Scope>) -> Self {
        Self {
            id,
            name: name.into(),
            scopes,
        }
    }

    pub fn has_scope(&self, scope: &Scope) -> bool {
        self.scopes
            .iter()
            .any(|s| s.is_wildcard() || s == scope)
    }
}
