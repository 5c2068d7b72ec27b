//! Order API Handlers
//!
//! Orders and their line items are created atomically; at creation every
//! outstanding balance equals the priced amount. The reconciliation driver
//! is the only writer of outstanding balances after this point.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::ServerState;
use crate::ledger::money::{self, to_decimal, to_f64};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, time};
use shared::models::{LedgerSide, Order, OrderCreate, OrderDetail, OrderItem, OrderStatus};
use shared::util::{new_id, now_millis};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub side: Option<LedgerSide>,
}

/// GET /api/orders - list orders, optionally by ledger side
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.storage.list_orders(query.side)?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - full order detail (items + payment history)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let order = state
        .storage
        .get_order(&id)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    let items = state.storage.get_items(&id)?;
    let payments = state.storage.list_payments(&id)?;
    Ok(Json(OrderDetail {
        order,
        items,
        payments,
    }))
}

/// POST /api/orders - create an order with its line items
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderDetail>> {
    validate_required_text(&payload.counterparty_id, "counterparty_id", MAX_SHORT_TEXT_LEN)?;
    if payload.items.is_empty() {
        return Err(AppError::validation("items must not be empty"));
    }

    let created_at = now_millis();
    let order_id = new_id();

    let mut total = Decimal::ZERO;
    let mut items = Vec::with_capacity(payload.items.len());
    for input in &payload.items {
        validate_required_text(&input.name, "item name", MAX_NAME_LEN)?;
        money::require_finite(input.unit_price, "unit_price")
            .map_err(|e| AppError::validation(e.to_string()))?;
        if input.unit_price < 0.0 {
            return Err(AppError::validation(format!(
                "unit_price must be non-negative, got {}",
                input.unit_price
            )));
        }
        if input.unit_price > money::MAX_PRICE {
            return Err(AppError::validation(format!(
                "unit_price exceeds maximum allowed ({}), got {}",
                money::MAX_PRICE,
                input.unit_price
            )));
        }
        if input.quantity <= 0 || input.quantity > money::MAX_QUANTITY {
            return Err(AppError::validation(format!(
                "quantity must be between 1 and {}, got {}",
                money::MAX_QUANTITY,
                input.quantity
            )));
        }

        let delivery_date = time::date_to_millis(time::parse_date(&input.delivery_date)?);
        let line_total = to_decimal(input.unit_price) * Decimal::from(input.quantity);
        total += line_total;

        items.push(OrderItem {
            id: new_id(),
            order_id: order_id.clone(),
            name: input.name.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            outstanding_price: to_f64(line_total),
            delivery_date,
            created_at,
        });
    }

    let order = Order {
        id: order_id.clone(),
        side: payload.side,
        counterparty_id: payload.counterparty_id.clone(),
        status: OrderStatus::Pending,
        total: to_f64(total),
        outstanding_total: to_f64(total),
        created_at,
    };

    let txn = state.storage.begin_write()?;
    state.storage.create_order(&txn, &order, &items)?;
    txn.commit()
        .map_err(crate::db::StorageError::from)?;

    tracing::info!(
        order_id = %order_id,
        side = %order.side,
        total = order.total,
        items = items.len(),
        "Order created"
    );

    Ok(Json(OrderDetail {
        order,
        items,
        payments: Vec::new(),
    }))
}
