//! Cashier API Handlers
//!
//! Thin wrappers around the reconciliation driver: the handlers only pick
//! the ledger side and pass the validated payload through. All balance
//! mutation and failure semantics live in [`crate::ledger::reconcile`].

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::ledger::money::{to_decimal, to_f64};
use crate::ledger::reconcile;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use shared::models::{LedgerSide, SettleOutcome, SettleRequest};

/// Operator recorded on payment records when the caller supplies none.
const DEFAULT_OPERATOR: &str = "system";

/// POST /api/cashier/purchase-settlements - settle buy-side orders
pub async fn settle_purchases(
    State(state): State<ServerState>,
    Json(payload): Json<SettleRequest>,
) -> AppResult<Json<SettleOutcome>> {
    settle(state, LedgerSide::Purchase, payload)
}

/// POST /api/cashier/sales-settlements - settle sell-side orders
pub async fn settle_sales(
    State(state): State<ServerState>,
    Json(payload): Json<SettleRequest>,
) -> AppResult<Json<SettleOutcome>> {
    settle(state, LedgerSide::Sales, payload)
}

fn settle(
    state: ServerState,
    side: LedgerSide,
    payload: SettleRequest,
) -> AppResult<Json<SettleOutcome>> {
    validate_optional_text(&payload.operator_id, "operator_id", MAX_SHORT_TEXT_LEN)?;
    let operator = payload.operator_id.as_deref().unwrap_or(DEFAULT_OPERATOR);
    let outcome = reconcile::settle(&state.storage, side, &payload, operator)?;
    Ok(Json(outcome))
}

/// Query params for the outstanding-balance summary
#[derive(Debug, Deserialize)]
pub struct OutstandingQuery {
    pub side: LedgerSide,
}

/// Aggregate outstanding-balance summary for one ledger side
#[derive(Debug, Serialize)]
pub struct OutstandingSummary {
    pub side: LedgerSide,
    /// Sum of outstanding totals across open orders
    pub outstanding_total: f64,
    /// Orders with a positive outstanding balance
    pub open_orders: usize,
}

/// GET /api/cashier/outstanding?side= - aggregate outstanding for one side
pub async fn outstanding(
    State(state): State<ServerState>,
    Query(query): Query<OutstandingQuery>,
) -> AppResult<Json<OutstandingSummary>> {
    let orders = state.storage.list_orders(Some(query.side))?;
    let mut total = Decimal::ZERO;
    let mut open_orders = 0;
    for order in &orders {
        let outstanding = to_decimal(order.outstanding_total);
        if outstanding > Decimal::ZERO {
            total += outstanding;
            open_orders += 1;
        }
    }
    Ok(Json(OutstandingSummary {
        side: query.side,
        outstanding_total: to_f64(total),
        open_orders,
    }))
}
