use crate::db::StorageError;
use thiserror::Error;

/// Reconciliation errors
///
/// `Inconsistent` and `Allocation` mean the stored ledger disagrees with
/// itself; they abort the pass and are never auto-corrected.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Ledger inconsistency: {0}")]
    Inconsistent(String),

    #[error("Allocation failed: {0}")]
    Allocation(String),

    #[error("No outstanding balance to settle")]
    NothingOutstanding,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
