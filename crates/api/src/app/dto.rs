//! Request DTOs and parsing helpers.
//!
//! Serde does the shape/type validation (`u64` amounts reject negative and
//! fractional numbers at deserialization); what remains here is id parsing
//! and the positivity check the engine is allowed to assume.

use axum::http::StatusCode;
use serde::Deserialize;

use walletd_core::{AccountId, Currency, IdempotencyKey};

use crate::app::errors::json_error;

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub currency: Option<Currency>,
}

#[derive(Debug, Deserialize)]
pub struct FundWalletRequest {
    pub amount: u64,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: u64,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

pub fn parse_account_id(raw: &str, field: &str) -> Result<AccountId, axum::response::Response> {
    raw.parse::<AccountId>().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "validation",
            format!("{field} must be a valid wallet id"),
        )
    })
}

pub fn require_positive_amount(amount: u64) -> Result<u64, axum::response::Response> {
    if amount == 0 {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation",
            "amount must be a positive number",
        ));
    }
    Ok(amount)
}

pub fn idempotency_key(raw: Option<String>) -> Option<IdempotencyKey> {
    raw.map(IdempotencyKey::from)
}
