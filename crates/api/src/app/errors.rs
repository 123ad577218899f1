use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use walletd_core::LedgerError;

/// Map each ledger error kind onto its transport status. The engine only
/// guarantees kind + message; everything HTTP-shaped happens here.
pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        LedgerError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LedgerError::InvalidOperation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_operation", msg)
        }
        LedgerError::InsufficientFunds(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_funds", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
