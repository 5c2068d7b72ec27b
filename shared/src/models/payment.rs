//! Payment Model
//!
//! Payment instruments are a closed enum with a fixed deduction priority —
//! a new instrument cannot enter the system without a slot in the priority
//! table. Payment records are append-only: once written they are the audit
//! trail of a reconciliation pass and are never updated or deleted.

use serde::{Deserialize, Serialize};

/// Payment instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Cash,
    Card,
    Cheque,
}

impl Instrument {
    /// Deduction priority: instruments are consumed in this order when a
    /// payment is split across several of them.
    pub const PRIORITY: [Instrument; 3] = [Instrument::Cash, Instrument::Card, Instrument::Cheque];
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instrument::Cash => write!(f, "cash"),
            Instrument::Card => write!(f, "card"),
            Instrument::Cheque => write!(f, "cheque"),
        }
    }
}

/// Immutable record of one instrument-specific allocation against one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub order_id: String,
    pub instrument: Instrument,
    /// Allocated amount in currency units (always > 0)
    pub amount: f64,
    pub operator_id: String,
    pub timestamp: i64,
}

/// Incoming payment amounts, one optional slot per instrument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub cash: Option<f64>,
    pub card: Option<f64>,
    pub cheque: Option<f64>,
}

impl PaymentBreakdown {
    /// Amount supplied for one instrument (0 when absent).
    pub fn amount_of(&self, instrument: Instrument) -> f64 {
        match instrument {
            Instrument::Cash => self.cash.unwrap_or(0.0),
            Instrument::Card => self.card.unwrap_or(0.0),
            Instrument::Cheque => self.cheque.unwrap_or(0.0),
        }
    }

    /// Single-instrument breakdown, mostly for tests and tooling.
    pub fn single(instrument: Instrument, amount: f64) -> Self {
        let mut breakdown = Self::default();
        match instrument {
            Instrument::Cash => breakdown.cash = Some(amount),
            Instrument::Card => breakdown.card = Some(amount),
            Instrument::Cheque => breakdown.cheque = Some(amount),
        }
        breakdown
    }
}

/// Order in which supplied orders receive payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    /// Caller-specified order
    Manual,
    /// Oldest order first (ascending creation time)
    #[default]
    Automatic,
}

/// Settle payload: distribute one payment across the given orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleRequest {
    pub order_ids: Vec<String>,
    pub payment: PaymentBreakdown,
    #[serde(default)]
    pub mode: AllocationMode,
    #[serde(default)]
    pub operator_id: Option<String>,
}

/// Result of a settlement pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleOutcome {
    /// Amount actually applied against outstanding balances
    pub applied: f64,
    /// Supplied amount left over after every target was exhausted
    pub unapplied: f64,
    /// Orders whose outstanding total reached zero in this pass
    pub settled_order_ids: Vec<String>,
    /// Payment records appended by this pass
    pub payments: Vec<PaymentRecord>,
}
