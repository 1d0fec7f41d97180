//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Service-level
/// failure kinds (conflicts, not-found, payment guards) live with the engines
/// that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A domain invariant was violated (e.g. arithmetic overflow).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

/// Failure reported by a repository collaborator.
///
/// The engines treat repositories as opaque ports; anything the backing store
/// cannot do comes back through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store rejected or failed the operation.
    #[error("repository backend failure: {0}")]
    Backend(String),

    /// A shared lock was poisoned by a panicking writer.
    #[error("repository lock poisoned")]
    LockPoisoned,
}
