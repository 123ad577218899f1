//! `walletd-api` — HTTP surface over the ledger engine.
//!
//! This layer only parses and shape-validates requests, forwards them to
//! the engine, and maps error kinds to transport status codes. Monetary
//! invariants live in `walletd-ledger`, not here.

pub mod app;
