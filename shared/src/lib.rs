//! Shared types for the ledger backend
//!
//! Domain types used across crates: ledger entities, payment types,
//! settlement payloads, and small utility helpers.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
