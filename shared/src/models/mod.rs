//! Domain models
//!
//! Passive records only — all balance mutation goes through the
//! reconciliation driver in `ledger-server`.

pub mod order;
pub mod payment;

// Re-exports
pub use order::{
    LedgerSide, Order, OrderCreate, OrderDetail, OrderItem, OrderItemCreate, OrderStatus,
};
pub use payment::{
    AllocationMode, Instrument, PaymentBreakdown, PaymentRecord, SettleOutcome, SettleRequest,
};
