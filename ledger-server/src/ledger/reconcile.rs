//! Reconciliation driver
//!
//! Bridges the pure allocation engine to persisted state for one payment
//! event. The whole pass runs inside a single write transaction: if any step
//! fails, the transaction is dropped and no item, order or payment record
//! mutation becomes visible.

use rust_decimal::Decimal;
use shared::models::{
    AllocationMode, LedgerSide, Order, OrderStatus, PaymentRecord, SettleOutcome, SettleRequest,
};
use shared::util::{new_id, now_millis};
use std::collections::HashSet;

use crate::db::LedgerStorage;

use super::allocation::{self, AllocationTarget};
use super::error::{LedgerError, LedgerResult};
use super::money::{sum_outstanding, to_decimal, to_f64, validate_breakdown};

/// Distribute one payment across the given orders of one ledger side.
///
/// Validation runs before any transaction is opened; everything after
/// `begin_write` either commits as a whole or leaves no trace.
pub fn settle(
    storage: &LedgerStorage,
    side: LedgerSide,
    request: &SettleRequest,
    operator_id: &str,
) -> LedgerResult<SettleOutcome> {
    validate_request(request)?;

    let txn = storage.begin_write()?;
    let outcome = settle_in_txn(storage, &txn, side, request, operator_id)?;
    txn.commit().map_err(crate::db::StorageError::from)?;

    tracing::info!(
        side = %side,
        orders = request.order_ids.len(),
        applied = outcome.applied,
        unapplied = outcome.unapplied,
        payments = outcome.payments.len(),
        "Settlement committed"
    );

    Ok(outcome)
}

fn validate_request(request: &SettleRequest) -> LedgerResult<()> {
    if request.order_ids.is_empty() {
        return Err(LedgerError::Validation(
            "order_ids must not be empty".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for id in &request.order_ids {
        if id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "order_ids must not contain empty identifiers".to_string(),
            ));
        }
        if !seen.insert(id.as_str()) {
            return Err(LedgerError::Validation(format!(
                "duplicate order id in request: {}",
                id
            )));
        }
    }
    validate_breakdown(&request.payment)
}

fn settle_in_txn(
    storage: &LedgerStorage,
    txn: &redb::WriteTransaction,
    side: LedgerSide,
    request: &SettleRequest,
    operator_id: &str,
) -> LedgerResult<SettleOutcome> {
    // Resolve every target or fail the whole request. An order on the other
    // ledger side is indistinguishable from a missing one to the caller.
    let mut orders: Vec<Order> = Vec::with_capacity(request.order_ids.len());
    for id in &request.order_ids {
        let order = storage
            .order_in_txn(txn, id)?
            .filter(|o| o.side == side)
            .ok_or_else(|| LedgerError::NotFound(format!("{} order {}", side, id)))?;
        orders.push(order);
    }

    if request.mode == AllocationMode::Automatic {
        // Oldest obligation first; id is the tie-break to keep the pass
        // reproducible when two orders share a creation timestamp.
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    }

    let mut targets = Vec::with_capacity(orders.len());
    for order in orders {
        let items = storage.items_in_txn(txn, &order.id)?;
        targets.push(AllocationTarget { order, items });
    }

    let plan = allocation::allocate(&request.payment, &targets)?;
    if plan.payment_applications.is_empty() {
        // Every target was already settled — nothing to apply.
        return Err(LedgerError::NothingOutstanding);
    }

    // Apply item deductions in memory, then persist.
    for application in &plan.item_applications {
        let target = targets
            .iter_mut()
            .find(|t| t.order.id == application.order_id)
            .ok_or_else(|| {
                LedgerError::Allocation(format!(
                    "plan references unknown order {}",
                    application.order_id
                ))
            })?;
        let item = target
            .items
            .iter_mut()
            .find(|i| i.id == application.item_id)
            .ok_or_else(|| {
                LedgerError::Allocation(format!(
                    "plan references unknown item {} on order {}",
                    application.item_id, application.order_id
                ))
            })?;
        let updated = to_decimal(item.outstanding_price) - application.amount;
        if updated < Decimal::ZERO {
            return Err(LedgerError::Allocation(format!(
                "item {} would go negative ({})",
                item.id, updated
            )));
        }
        item.outstanding_price = to_f64(updated);
        storage.put_item(txn, item)?;
    }

    // Recompute each touched order's outstanding total from the fresh item
    // sums — never by subtraction — so a pass also heals aggregate drift.
    let touched: HashSet<&str> = plan
        .item_applications
        .iter()
        .map(|a| a.order_id.as_str())
        .collect();
    let mut settled_order_ids = Vec::new();
    for target in &mut targets {
        if !touched.contains(target.order.id.as_str()) {
            continue;
        }
        let fresh = sum_outstanding(&target.items);
        target.order.outstanding_total = to_f64(fresh);
        if fresh == Decimal::ZERO {
            settled_order_ids.push(target.order.id.clone());
            // Payment completion only drives the buy-side lifecycle; sales
            // orders are shipped by the fulfillment workflow.
            if side == LedgerSide::Purchase {
                target.order.status = OrderStatus::Delivered;
            }
        }
        storage.put_order(txn, &target.order)?;
    }

    // Append the audit trail in one batch.
    let timestamp = now_millis();
    let mut payments = Vec::with_capacity(plan.payment_applications.len());
    for application in &plan.payment_applications {
        let record = PaymentRecord {
            payment_id: new_id(),
            order_id: application.order_id.clone(),
            instrument: application.instrument,
            amount: to_f64(application.amount),
            operator_id: operator_id.to_string(),
            timestamp,
        };
        storage.append_payment(txn, &record)?;
        payments.push(record);
    }

    if plan.unapplied > Decimal::ZERO {
        tracing::warn!(
            unapplied = to_f64(plan.unapplied),
            "Payment exceeds outstanding balances; excess left unallocated"
        );
    }

    Ok(SettleOutcome {
        applied: to_f64(plan.applied()),
        unapplied: to_f64(plan.unapplied),
        settled_order_ids,
        payments,
    })
}
