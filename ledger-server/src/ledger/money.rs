//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored and serialized as `f64` rounded to 2 decimal places;
//! every calculation goes through `Decimal` in between.

use crate::ledger::error::LedgerError;
use rust_decimal::prelude::*;
use shared::models::{Instrument, PaymentBreakdown};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed amount per instrument (1,000,000)
pub const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Maximum allowed price per item unit (1,000,000)
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Maximum allowed quantity per line item
pub const MAX_QUANTITY: i32 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> Result<(), LedgerError> {
    if !value.is_finite() {
        return Err(LedgerError::Validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a payment breakdown before any transaction is opened.
///
/// Each supplied instrument amount must be finite, non-negative and within
/// bounds; the total across instruments must be positive.
pub fn validate_breakdown(payment: &PaymentBreakdown) -> Result<(), LedgerError> {
    for instrument in Instrument::PRIORITY {
        let amount = payment.amount_of(instrument);
        require_finite(amount, &format!("{} amount", instrument))?;
        if amount < 0.0 {
            return Err(LedgerError::Validation(format!(
                "{} amount must be non-negative, got {}",
                instrument, amount
            )));
        }
        if amount > MAX_PAYMENT_AMOUNT {
            return Err(LedgerError::Validation(format!(
                "{} amount exceeds maximum allowed ({}), got {}",
                instrument, MAX_PAYMENT_AMOUNT, amount
            )));
        }
    }

    let total: Decimal = Instrument::PRIORITY
        .iter()
        .map(|i| to_decimal(payment.amount_of(*i)))
        .sum();
    if total <= Decimal::ZERO {
        return Err(LedgerError::Validation(
            "payment must include at least one positive instrument amount".to_string(),
        ));
    }

    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Sum the outstanding prices of a slice of items with precise arithmetic
pub fn sum_outstanding(items: &[shared::models::OrderItem]) -> Decimal {
    items.iter().map(|i| to_decimal(i.outstanding_price)).sum()
}
