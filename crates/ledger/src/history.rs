//! Transaction log: per-account, append-only, insertion-ordered.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use walletd_core::{AccountId, TransactionId, TransferGroupId};

/// What a transaction record represents from its owning account's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Fund,
    TransferOut,
    TransferIn,
}

/// One immutable history entry.
///
/// `amount` is in major units (the display denomination); stored balances
/// are in minor units, converted at the engine boundary. The two records
/// produced by one transfer share a `transfer_group` and carry each
/// other's account as `counterparty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: u64,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_group: Option<TransferGroupId>,
}

/// Per-account ordered sequences of transaction records.
///
/// Insertion order is load-bearing: history is displayed in the order
/// records were appended. Records are never updated or removed.
#[derive(Debug, Default)]
pub struct TransactionLog {
    entries: HashMap<AccountId, Vec<TransactionRecord>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record to the account's sequence.
    pub fn append(&mut self, account_id: AccountId, record: TransactionRecord) {
        self.entries.entry(account_id).or_default().push(record);
    }

    /// Full history of an account, oldest first. An account with no
    /// transactions yet has an empty history, not an error.
    pub fn history_of(&self, account_id: AccountId) -> &[TransactionRecord] {
        self.entries
            .get(&account_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
