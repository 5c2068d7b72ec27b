//! Cashier API module (payment settlement)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cashier", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/purchase-settlements", post(handler::settle_purchases))
        .route("/sales-settlements", post(handler::settle_sales))
        .route("/outstanding", get(handler::outstanding))
}
