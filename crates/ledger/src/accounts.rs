//! Account store: account identifiers mapped to balance + currency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use walletd_core::{AccountId, Currency};

/// A wallet account.
///
/// The balance is held in minor units (cents) and is never negative; the
/// engine checks sufficiency before every debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub currency: Currency,
    /// Balance in minor units.
    pub balance_minor: u64,
}

/// Mapping from account id to account state. Leaf component: it owns no
/// locking and performs no business validation beyond checked arithmetic.
/// All access goes through the ledger engine, which upholds the
/// non-negative balance contract.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<AccountId, Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh account with a zero balance. Always succeeds.
    pub fn create(&mut self, currency: Currency) -> Account {
        let account = Account {
            id: AccountId::new(),
            currency,
            balance_minor: 0,
        };
        self.accounts.insert(account.id, account);
        account
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Add `minor` to the account's balance, returning the new balance.
    ///
    /// Returns `None` if the account is missing or the addition would
    /// overflow; the account is left untouched in that case.
    pub fn credit(&mut self, id: AccountId, minor: u64) -> Option<u64> {
        let account = self.accounts.get_mut(&id)?;
        account.balance_minor = account.balance_minor.checked_add(minor)?;
        Some(account.balance_minor)
    }

    /// Subtract `minor` from the account's balance, returning the new
    /// balance.
    ///
    /// The caller must have verified sufficiency first; this method never
    /// drives a balance negative. Returns `None` if the account is missing
    /// or the balance is below `minor`, leaving the account untouched.
    pub fn debit(&mut self, id: AccountId, minor: u64) -> Option<u64> {
        let account = self.accounts.get_mut(&id)?;
        account.balance_minor = account.balance_minor.checked_sub(minor)?;
        Some(account.balance_minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_with_zero_balance() {
        let mut store = AccountStore::new();
        let account = store.create(Currency::Usd);

        assert_eq!(account.balance_minor, 0);
        assert_eq!(account.currency, Currency::Usd);
        assert_eq!(store.get(account.id), Some(&account));
    }

    #[test]
    fn created_accounts_get_distinct_ids() {
        let mut store = AccountStore::new();
        let a = store.create(Currency::Usd);
        let b = store.create(Currency::Usd);

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn credit_and_debit_apply_deltas() {
        let mut store = AccountStore::new();
        let id = store.create(Currency::Eur).id;

        assert_eq!(store.credit(id, 500), Some(500));
        assert_eq!(store.debit(id, 200), Some(300));
        assert_eq!(store.get(id).unwrap().balance_minor, 300);
    }

    #[test]
    fn debit_below_balance_is_refused_without_mutation() {
        let mut store = AccountStore::new();
        let id = store.create(Currency::Usd).id;
        store.credit(id, 100).unwrap();

        assert_eq!(store.debit(id, 101), None);
        assert_eq!(store.get(id).unwrap().balance_minor, 100);
    }

    #[test]
    fn credit_overflow_is_refused_without_mutation() {
        let mut store = AccountStore::new();
        let id = store.create(Currency::Usd).id;
        store.credit(id, u64::MAX).unwrap();

        assert_eq!(store.credit(id, 1), None);
        assert_eq!(store.get(id).unwrap().balance_minor, u64::MAX);
    }

    #[test]
    fn unknown_account_yields_none() {
        let mut store = AccountStore::new();
        let id = AccountId::new();

        assert_eq!(store.get(id), None);
        assert_eq!(store.credit(id, 1), None);
        assert_eq!(store.debit(id, 1), None);
    }
}
