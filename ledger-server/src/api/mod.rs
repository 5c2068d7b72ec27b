//! API routing module
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`orders`] - order creation and queries
//! - [`cashier`] - payment settlement and outstanding-balance queries

pub mod cashier;
pub mod health;
pub mod orders;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
