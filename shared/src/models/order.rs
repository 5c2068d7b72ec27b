//! Order Model
//!
//! One `Order` per commercial transaction with a counterparty, carrying its
//! line items' priced amounts and the mutable outstanding balances. The
//! outstanding fields are owned by the reconciliation driver: nothing else
//! writes them after order creation (which sets outstanding = total).

use serde::{Deserialize, Serialize};

use super::payment::PaymentRecord;

/// Ledger side of an order: purchases (buy-side, payable to a supplier)
/// or sales (sell-side, receivable from a client).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSide {
    Purchase,
    Sales,
}

impl std::fmt::Display for LedgerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerSide::Purchase => write!(f, "purchase"),
            LedgerSide::Sales => write!(f, "sales"),
        }
    }
}

/// Order lifecycle status.
///
/// Buy-side orders reach the terminal `Delivered` when their outstanding
/// total hits zero after a reconciliation pass. Sell-side shipping states
/// are driven by the fulfillment workflow, not by payments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Delivered,
    Shipped,
}

/// Order entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub side: LedgerSide,
    /// Counterparty reference (supplier for purchases, client for sales)
    pub counterparty_id: String,
    pub status: OrderStatus,
    /// Sum of line items at creation, in currency units
    pub total: f64,
    /// Unpaid remainder; always equals the sum of the items' outstanding
    pub outstanding_total: f64,
    pub created_at: i64,
}

/// One priced line within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub name: String,
    pub quantity: i32,
    /// Price per unit in currency units
    pub unit_price: f64,
    /// Unpaid remainder of `unit_price * quantity`; non-increasing
    pub outstanding_price: f64,
    /// Agreed delivery date (Unix millis) — the allocation-priority key
    pub delivery_date: i64,
    pub created_at: i64,
}

/// Create order payload (order and items are created atomically).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub side: LedgerSide,
    pub counterparty_id: String,
    pub items: Vec<OrderItemCreate>,
}

/// Line item within a create payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub name: String,
    pub quantity: i32,
    /// Price per unit in currency units
    pub unit_price: f64,
    /// Delivery date as `YYYY-MM-DD`
    pub delivery_date: String,
}

/// Full order view: entity + items + payment history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<PaymentRecord>,
}
