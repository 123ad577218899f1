//! Wallet ledger engine.
//!
//! In-memory account/transaction store plus the transfer protocol: atomic,
//! idempotent fund and transfer operations over a single-writer state.
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod accounts;
pub mod engine;
pub mod history;
pub mod idempotency;

pub use accounts::{Account, AccountStore};
pub use engine::{
    AccountSnapshot, FundReceipt, LedgerEngine, TransferReceipt, WalletDetails,
};
pub use history::{TransactionKind, TransactionLog, TransactionRecord};
pub use idempotency::{CachedOutcome, IdempotencyCache};
