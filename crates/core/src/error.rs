//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger domain.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Domain-level ledger error.
///
/// Keep this focused on deterministic business failures. Transport concerns
/// (status codes, serialization) belong to the caller; this type only
/// guarantees the kind and a descriptive message travel together.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A referenced account identifier does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is structurally invalid regardless of state
    /// (e.g. self-transfer).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation is semantically blocked by a business rule
    /// (e.g. cross-currency transfer).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The sender's balance is below the requested transfer amount.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
}

impl LedgerError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::InsufficientFunds(msg.into())
    }
}
