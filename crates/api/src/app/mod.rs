//! HTTP application wiring (axum router + engine wiring).
//!
//! Folder layout:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use walletd_ledger::LedgerEngine;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router with a fresh engine (public entrypoint used
/// by `main.rs`).
pub fn build_app() -> Router {
    build_app_with_engine(Arc::new(LedgerEngine::new()))
}

/// Build the router around an existing engine (tests inject their own).
pub fn build_app_with_engine(engine: Arc<LedgerEngine>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(engine))
}
