use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use walletd_ledger::LedgerEngine;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/transfers", post(create_transfer))
}

pub async fn create_transfer(
    Extension(engine): Extension<Arc<LedgerEngine>>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    let sender_id = match dto::parse_account_id(&body.sender_id, "sender_id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let receiver_id = match dto::parse_account_id(&body.receiver_id, "receiver_id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let amount = match dto::require_positive_amount(body.amount) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match engine.transfer_funds(
        sender_id,
        receiver_id,
        amount,
        dto::idempotency_key(body.idempotency_key),
    ) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
