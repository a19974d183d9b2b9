use thiserror::Error;

use crate::ledger::ExpenseId;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Expense not found: {0}")]
    NotFound(ExpenseId),
    #[error("No expense ids left above {0}")]
    IdsExhausted(u64),
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Failures raised while reading or writing the durable ledger snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
