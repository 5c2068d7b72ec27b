//! Database Module
//!
//! Embedded ledger store backed by redb. All balance-mutating operations run
//! inside a single write transaction (see [`storage::LedgerStorage`]), which
//! is the system's only concurrency-control mechanism: redb serializes write
//! transactions, so two settlement passes can never interleave on the same
//! outstanding balances.

pub mod storage;

pub use storage::{LedgerStorage, StorageError, StorageResult};
