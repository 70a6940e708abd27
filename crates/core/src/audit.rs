//! Append-only audit trail record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit row per inbound request outcome.
///
/// Insert-once: there is no update or delete path for audit entries anywhere
/// in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub client_name: Option<String>,
    pub http_method: String,
    pub path: String,
    pub status_code: u16,
    pub duration_ms: i64,
    pub ip_address: Option<String>,
}

impl AuditEntry {
    pub fn new(
        client_name: Option<String>,
        http_method: impl Into<String>,
        path: impl Into<String>,
        status_code: u16,
        duration_ms: i64,
        ip_address: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            client_name,
            http_method: http_method.into(),
            path: path.into(),
            status_code,
            duration_ms,
            ip_address,
        }
    }
}
