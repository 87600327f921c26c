use crate::json::JsonError;
use crate::mapping::MappingError;
use thiserror::Error;

/// Failures reported by a [`DocumentStore`](crate::storage::DocumentStore).
///
/// These are opaque to the mapping layer: nothing here is classified further or
/// retried, callers see exactly what the store produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document '{0}' not found")]
    DocumentNotFound(String),

    #[error("Document '{0}' already exists")]
    DocumentExists(String),

    #[error("CAS mismatch on document '{0}'")]
    CasMismatch(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Store error: {0}")]
    Other(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction context mismatch: expected {expected}, found {actual}")]
    ContextMismatch { expected: String, actual: String },

    #[error("{0} can not be used inside a transaction")]
    NotAllowedInTransaction(String),

    #[error("Transaction {0} is not active")]
    NotActive(String),

    #[error("Transaction {id} failed to commit: {reason}")]
    CommitFailed { id: String, reason: String },

    #[error("Lock error: {0}")]
    LockError(String),
}

impl<T> From<std::sync::PoisonError<T>> for TransactionError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

/// Top-level error returned by the client facade.
#[derive(Error, Debug)]
pub enum OdmError {
    #[error(transparent)]
    Json(#[from] JsonError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, OdmError>;
