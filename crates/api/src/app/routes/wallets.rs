use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use walletd_ledger::LedgerEngine;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/wallets", post(create_wallet))
        .route("/wallets/:id", get(get_wallet))
        .route("/wallets/:id/fund", post(fund_wallet))
}

pub async fn create_wallet(
    Extension(engine): Extension<Arc<LedgerEngine>>,
    Json(body): Json<dto::CreateWalletRequest>,
) -> axum::response::Response {
    let snapshot = engine.open_account(body.currency);
    (StatusCode::CREATED, Json(snapshot)).into_response()
}

pub async fn get_wallet(
    Extension(engine): Extension<Arc<LedgerEngine>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let account_id = match dto::parse_account_id(&id, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match engine.wallet_details(account_id) {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn fund_wallet(
    Extension(engine): Extension<Arc<LedgerEngine>>,
    Path(id): Path<String>,
    Json(body): Json<dto::FundWalletRequest>,
) -> axum::response::Response {
    let account_id = match dto::parse_account_id(&id, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let amount = match dto::require_positive_amount(body.amount) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match engine.fund_wallet(account_id, amount, dto::idempotency_key(body.idempotency_key)) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
