//! `walletd-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, currency/money conversion, and the ledger error
//! taxonomy shared by every other crate in the workspace.

pub mod error;
pub mod id;
pub mod money;

pub use error::{LedgerError, LedgerResult};
pub use id::{AccountId, IdempotencyKey, TransactionId, TransferGroupId};
pub use money::{Currency, MINOR_UNITS_PER_MAJOR, to_major_units, to_minor_units};
