// src/error.rs
use thiserror::Error;

/// Errors produced by ledger operations themselves. Both classes are
/// detected before any field is written, so a failing call never leaves
/// an account table half-updated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("record {id} not found (valid ids are 1..={count})")]
    NotFound { id: u64, count: u64 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Data format error: {0}")]
    FormatError(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Identity error: {0}")]
    Identity(String),
}

// Result type aliases for convenience
pub type LedgerResult<T> = Result<T, LedgerError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type AppResult<T> = Result<T, AppError>;
