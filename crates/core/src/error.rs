//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business/domain failures. Infrastructure
/// concerns are translated into `Unavailable` at the service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Credential missing or unresolvable (unknown hash, inactive client).
    #[error("unauthorized")]
    Unauthorized,

    /// Resolved identity lacks a required scope, or touched another
    /// identity's resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed or semantically invalid input (empty lines, non-positive
    /// quantity).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// A uniqueness conflict that survived retries (e.g. order number
    /// generation exhausted its attempts).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The durable store or cache transport failed; any in-flight
    /// transaction was rolled back.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl DomainError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
