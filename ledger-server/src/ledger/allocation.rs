//! Allocation engine
//!
//! Pure computation: given a payment breakdown and an ordered list of target
//! orders (each carrying its items in allocation-priority order), decide how
//! much to subtract from every item's outstanding price and which payment
//! records to append — without touching storage. The reconciliation driver
//! applies the resulting plan.
//!
//! Guarantees on a returned plan:
//! - per order, the payment applications sum to exactly the amount taken off
//!   that order's outstanding total;
//! - no item application exceeds the item's outstanding price;
//! - no instrument is consumed beyond its supplied amount;
//! - `unapplied` is whatever the targets could not absorb.
//!
//! The engine fails closed: if an order's stored outstanding total disagrees
//! with the sum of its items' outstanding prices, the whole computation is
//! rejected — a mismatch means corrupted data, not something to reconcile
//! silently.

use rust_decimal::Decimal;
use shared::models::{Instrument, Order, OrderItem, PaymentBreakdown};

use super::error::LedgerError;
use super::money::{to_decimal, validate_breakdown};

/// One order with its items, already in allocation-priority order
/// (delivery_date ascending, then created_at).
#[derive(Debug, Clone)]
pub struct AllocationTarget {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Amount to subtract from one item's outstanding price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemApplication {
    pub order_id: String,
    pub item_id: String,
    pub amount: Decimal,
}

/// One pending payment record: an instrument-specific amount against one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentApplication {
    pub order_id: String,
    pub instrument: Instrument,
    pub amount: Decimal,
}

/// Computed allocation plan.
#[derive(Debug, Clone, Default)]
pub struct AllocationPlan {
    pub item_applications: Vec<ItemApplication>,
    pub payment_applications: Vec<PaymentApplication>,
    /// Supplied amount left over once every target is exhausted
    pub unapplied: Decimal,
}

impl AllocationPlan {
    /// Total amount the plan applies against outstanding balances.
    pub fn applied(&self) -> Decimal {
        self.payment_applications.iter().map(|p| p.amount).sum()
    }
}

/// Compute an allocation plan for `payment` across `targets`, in the given
/// target order.
pub fn allocate(
    payment: &PaymentBreakdown,
    targets: &[AllocationTarget],
) -> Result<AllocationPlan, LedgerError> {
    validate_breakdown(payment)?;

    // Instrument balances in fixed deduction priority; zero-amount
    // instruments are skipped up front.
    let mut balances: Vec<(Instrument, Decimal)> = Instrument::PRIORITY
        .iter()
        .map(|i| (*i, to_decimal(payment.amount_of(*i))))
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .collect();

    let mut remaining: Decimal = balances.iter().map(|(_, amount)| *amount).sum();
    let mut plan = AllocationPlan::default();

    for target in targets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let order_id = target.order.id.as_str();
        let stored = to_decimal(target.order.outstanding_total);
        let item_sum: Decimal = target
            .items
            .iter()
            .map(|i| to_decimal(i.outstanding_price))
            .sum();

        if stored < Decimal::ZERO {
            return Err(LedgerError::Inconsistent(format!(
                "order {}: stored outstanding total is negative ({})",
                order_id, stored
            )));
        }
        if target.items.is_empty() && stored > Decimal::ZERO {
            return Err(LedgerError::Inconsistent(format!(
                "order {}: outstanding total {} but no outstanding items",
                order_id, stored
            )));
        }
        if item_sum != stored {
            return Err(LedgerError::Inconsistent(format!(
                "order {}: stored outstanding total {} does not match item sum {}",
                order_id, stored, item_sum
            )));
        }

        // Fully paid already — skip without error or payment record.
        if stored == Decimal::ZERO {
            continue;
        }

        let apply_to_order = remaining.min(stored);

        // Split the order's share across instruments by priority.
        let mut needed = apply_to_order;
        for (instrument, balance) in balances.iter_mut() {
            if needed <= Decimal::ZERO {
                break;
            }
            if *balance <= Decimal::ZERO {
                continue;
            }
            let take = (*balance).min(needed);
            *balance -= take;
            needed -= take;
            plan.payment_applications.push(PaymentApplication {
                order_id: order_id.to_string(),
                instrument: *instrument,
                amount: take,
            });
        }
        if needed > Decimal::ZERO {
            // Unreachable while `remaining` equals the sum of balances.
            return Err(LedgerError::Allocation(format!(
                "order {}: instrument split short by {}",
                order_id, needed
            )));
        }

        // Walk the items in priority order, draining each to zero before
        // moving on.
        let mut left = apply_to_order;
        for item in &target.items {
            if left <= Decimal::ZERO {
                break;
            }
            let outstanding = to_decimal(item.outstanding_price);
            if outstanding <= Decimal::ZERO {
                continue;
            }
            let take = outstanding.min(left);
            left -= take;
            plan.item_applications.push(ItemApplication {
                order_id: order_id.to_string(),
                item_id: item.id.clone(),
                amount: take,
            });
        }
        if left > Decimal::ZERO {
            return Err(LedgerError::Allocation(format!(
                "order {}: item walk left {} unapplied",
                order_id, left
            )));
        }

        remaining -= apply_to_order;
    }

    plan.unapplied = remaining;
    Ok(plan)
}
