//! Idempotency cache: client token to the receipt of the original call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use walletd_core::IdempotencyKey;

use crate::engine::{FundReceipt, TransferReceipt};

/// The receipt stored for a completed mutating call, discriminated by
/// operation so each operation returns its own fixed payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachedOutcome {
    Fund(FundReceipt),
    Transfer(TransferReceipt),
}

/// Token-keyed cache of completed mutating calls.
///
/// Entries are written once, on the first successful call bearing a token,
/// and then only read. There is no eviction or TTL: a replayed token must
/// keep returning the original receipt for as long as the process lives,
/// so the cache grows without bound. Known limitation for long-lived
/// deployments.
#[derive(Debug, Default)]
pub struct IdempotencyCache {
    entries: HashMap<IdempotencyKey, CachedOutcome>,
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &IdempotencyKey) -> Option<&CachedOutcome> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: IdempotencyKey, outcome: CachedOutcome) {
        self.entries.insert(key, outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AccountSnapshot;
    use walletd_core::{AccountId, Currency};

    fn fund_outcome(balance: u64) -> CachedOutcome {
        CachedOutcome::Fund(FundReceipt {
            account: AccountSnapshot {
                id: AccountId::new(),
                currency: Currency::Usd,
                balance,
            },
        })
    }

    #[test]
    fn missing_key_is_a_miss() {
        let cache = IdempotencyCache::new();
        assert!(cache.get(&IdempotencyKey::from("tok-1")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn inserted_outcome_is_returned_verbatim() {
        let mut cache = IdempotencyCache::new();
        let key = IdempotencyKey::from("tok-1");
        let outcome = fund_outcome(100);

        cache.insert(key.clone(), outcome.clone());

        assert_eq!(cache.get(&key), Some(&outcome));
        assert_eq!(cache.len(), 1);
    }
}
