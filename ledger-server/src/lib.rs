//! Ledger Server - trading/ERP cashiering backend
//!
//! # Architecture Overview
//!
//! The core of this service is the payment-allocation and outstanding-balance
//! reconciliation engine: one payment is distributed across multiple orders
//! and line items, by priority order, across multiple payment instruments,
//! while per-item, per-order and aggregate outstanding balances stay
//! consistent under partial payments.
//!
//! # Module Structure
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # Config, state, HTTP server
//! ├── api/           # HTTP routes and handlers
//! ├── ledger/        # Allocation engine + reconciliation driver
//! ├── db/            # redb storage layer
//! └── utils/         # Errors, logging, validation, time
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod ledger;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use db::LedgerStorage;
pub use ledger::{LedgerError, settle};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, then initialize logging from the environment.
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(level.as_deref(), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    __           __
   / /   ___  ____/ /___ ____  _____
  / /   / _ \/ __  / __ `/ _ \/ ___/
 / /___/  __/ /_/ / /_/ /  __/ /
/_____/\___/\__,_/\__, /\___/_/
                 /____/
    "#
    );
}
