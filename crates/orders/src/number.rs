//! Human-readable order number generation.
//!
//! Format: `PO-<PREFIX>-<UTC yyyyMMdd>-<6 uppercase hex>`. The suffix is
//! random; uniqueness is enforced by the store's constraint, and the caller
//! regenerates on collision (bounded).

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Fallback prefix for identities that yield no usable characters.
const FALLBACK_PREFIX: &str = "GEN";

/// Derive the short source prefix from a client name: the first three
/// ASCII-alphanumeric characters, uppercased ("MobilApp" -> "MOB",
/// "ERPKonnektör" -> "ERP").
fn source_prefix(source_application: &str) -> String {
    let prefix: String = source_application
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if prefix.len() < 3 {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    }
}

/// Generate an order number for the given source at the given instant.
pub fn generate_order_number(source_application: &str, now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    format!(
        "PO-{}-{}-{}",
        source_prefix(source_application),
        now.format("%Y%m%d"),
        suffix
    )
}
