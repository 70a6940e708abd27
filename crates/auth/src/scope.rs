use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Capability scope identifier.
///
/// Scopes are modeled as opaque strings (e.g. "orders:write"). A special
/// wildcard scope `"*"` can be used by provisioning to indicate "allow all"
/// without hardcoding the full scope list into client records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Cow<'static, str>);

impl Scope {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a comma-separated grant string as stored by provisioning
/// (e.g. `"storage:read,orders:write"`) into a scope list.
///
/// Empty segments are dropped; whitespace around segments is trimmed.
pub fn parse_scopes(grants: &str) -> Vec<Scope> {
    grants
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Scope::new(s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_grants() {
        let scopes = parse_scopes("storage:read, orders:write,orders:read");
        assert_eq!(
            scopes,
            vec![
                Scope::new("storage:read"),
                Scope::new("orders:write"),
                Scope::new("orders:read"),
            ]
        );
    }

    #[test]
    fn drops_empty_segments() {
        assert!(parse_scopes("").is_empty());
        assert_eq!(parse_scopes(",orders:read,,").len(), 1);
    }
}
