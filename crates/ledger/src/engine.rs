//! Ledger engine: account creation, funding, transfers, detail retrieval.
//!
//! All monetary invariants are enforced here and nowhere else. The engine
//! owns the account store, the transaction log, and the idempotency cache
//! as one state unit behind a single `RwLock`: a mutating operation holds
//! the write lock for its whole read-check-mutate-append sequence, so no
//! reader can observe a debit without its matching credit.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use walletd_core::{
    AccountId, Currency, IdempotencyKey, LedgerError, LedgerResult, TransactionId,
    TransferGroupId, to_major_units, to_minor_units,
};

use crate::accounts::{Account, AccountStore};
use crate::history::{TransactionKind, TransactionLog, TransactionRecord};
use crate::idempotency::{CachedOutcome, IdempotencyCache};

/// Account state as exposed to callers: balance in major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub currency: Currency,
    pub balance: u64,
}

/// Result payload of a successful `fund_wallet` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundReceipt {
    pub account: AccountSnapshot,
}

/// Result payload of a successful `transfer_funds` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_group: TransferGroupId,
    pub sender: AccountSnapshot,
    pub receiver: AccountSnapshot,
}

/// Result payload of `wallet_details`: snapshot plus full ordered history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDetails {
    pub account: AccountSnapshot,
    pub transactions: Vec<TransactionRecord>,
}

/// The shared ledger state. Only the engine touches it, and only under
/// the lock.
#[derive(Debug, Default)]
struct LedgerState {
    accounts: AccountStore,
    history: TransactionLog,
    idempotency: IdempotencyCache,
}

/// Single-process, in-memory ledger engine.
///
/// Constructed once per process (or per test); never expose the raw
/// containers to callers.
#[derive(Debug)]
pub struct LedgerEngine {
    state: RwLock<LedgerState>,
    default_currency: Currency,
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerEngine {
    pub fn new() -> Self {
        Self::with_default_currency(Currency::default())
    }

    /// Engine whose `open_account` defaults to `currency` when the caller
    /// omits one.
    pub fn with_default_currency(currency: Currency) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            default_currency: currency,
        }
    }

    // No code path panics while holding the lock (all arithmetic is
    // checked), so a poisoned lock still guards consistent state.
    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new wallet account with a zero balance.
    pub fn open_account(&self, currency: Option<Currency>) -> AccountSnapshot {
        let currency = currency.unwrap_or(self.default_currency);
        let mut state = self.write();
        let account = state.accounts.create(currency);
        tracing::info!(account = %account.id, currency = %currency, "opened wallet");
        snapshot(&account)
    }

    /// Credit `amount` (major units) onto the account and append a `FUND`
    /// record.
    ///
    /// With an idempotency key, a retried call returns the original
    /// receipt and performs no further side effects.
    pub fn fund_wallet(
        &self,
        account_id: AccountId,
        amount: u64,
        key: Option<IdempotencyKey>,
    ) -> LedgerResult<FundReceipt> {
        let mut state = self.write();

        if let Some(key) = &key {
            if let Some(outcome) = state.idempotency.get(key) {
                return match outcome {
                    CachedOutcome::Fund(receipt) => {
                        tracing::debug!(%key, "replayed funding from idempotency cache");
                        Ok(receipt.clone())
                    }
                    CachedOutcome::Transfer(_) => Err(LedgerError::conflict(
                        "idempotency key was already used for a transfer",
                    )),
                };
            }
        }

        let account = state
            .accounts
            .get(account_id)
            .ok_or_else(|| LedgerError::not_found(format!("account {account_id} does not exist")))?;
        let currency = account.currency;

        let minor = to_minor_units(amount)
            .ok_or_else(|| LedgerError::invalid_operation("amount exceeds representable range"))?;
        let new_balance_minor = state
            .accounts
            .credit(account_id, minor)
            .ok_or_else(|| LedgerError::invalid_operation("funding would overflow the balance"))?;

        state.history.append(
            account_id,
            TransactionRecord {
                id: TransactionId::new(),
                account_id,
                kind: TransactionKind::Fund,
                amount,
                occurred_at: Utc::now(),
                counterparty: None,
                transfer_group: None,
            },
        );

        let receipt = FundReceipt {
            account: AccountSnapshot {
                id: account_id,
                currency,
                balance: to_major_units(new_balance_minor),
            },
        };
        if let Some(key) = key {
            state
                .idempotency
                .insert(key, CachedOutcome::Fund(receipt.clone()));
        }

        tracing::debug!(account = %account_id, amount, "funded wallet");
        Ok(receipt)
    }

    /// Move `amount` (major units) from sender to receiver, appending one
    /// `TRANSFER_OUT` and one `TRANSFER_IN` record linked by a fresh
    /// transfer group.
    ///
    /// Every validation runs before the first mutation, so an error never
    /// leaves the ledger partially updated.
    pub fn transfer_funds(
        &self,
        sender_id: AccountId,
        receiver_id: AccountId,
        amount: u64,
        key: Option<IdempotencyKey>,
    ) -> LedgerResult<TransferReceipt> {
        let mut state = self.write();

        if let Some(key) = &key {
            if let Some(outcome) = state.idempotency.get(key) {
                return match outcome {
                    CachedOutcome::Transfer(receipt) => {
                        tracing::debug!(%key, "replayed transfer from idempotency cache");
                        Ok(receipt.clone())
                    }
                    CachedOutcome::Fund(_) => Err(LedgerError::conflict(
                        "idempotency key was already used for a funding",
                    )),
                };
            }
        }

        // Structural check first: a self-transfer on a nonexistent account
        // is still a conflict, not a not-found.
        if sender_id == receiver_id {
            return Err(LedgerError::conflict("cannot transfer to the same wallet"));
        }

        let sender = state
            .accounts
            .get(sender_id)
            .ok_or_else(|| LedgerError::not_found(format!("sender {sender_id} does not exist")))?;
        let sender_currency = sender.currency;
        let sender_balance_minor = sender.balance_minor;

        let receiver = state.accounts.get(receiver_id).ok_or_else(|| {
            LedgerError::not_found(format!("receiver {receiver_id} does not exist"))
        })?;
        let receiver_currency = receiver.currency;
        let receiver_balance_minor = receiver.balance_minor;

        if sender_currency != receiver_currency {
            return Err(LedgerError::invalid_operation(format!(
                "cross-currency transfer is not supported ({sender_currency} -> {receiver_currency})"
            )));
        }

        if to_major_units(sender_balance_minor) < amount {
            return Err(LedgerError::insufficient_funds(format!(
                "balance {} is below the requested {amount}",
                to_major_units(sender_balance_minor)
            )));
        }

        let minor = to_minor_units(amount)
            .ok_or_else(|| LedgerError::invalid_operation("amount exceeds representable range"))?;
        if receiver_balance_minor.checked_add(minor).is_none() {
            return Err(LedgerError::invalid_operation(
                "transfer would overflow the receiver's balance",
            ));
        }

        // All checks passed; the two mutations below cannot fail, and the
        // write lock keeps them invisible until both are applied.
        let sender_balance = state
            .accounts
            .debit(sender_id, minor)
            .ok_or_else(|| LedgerError::invalid_operation("debit refused by account store"))?;
        let receiver_balance = state
            .accounts
            .credit(receiver_id, minor)
            .ok_or_else(|| LedgerError::invalid_operation("credit refused by account store"))?;

        let transfer_group = TransferGroupId::new();
        let now = Utc::now();
        state.history.append(
            sender_id,
            TransactionRecord {
                id: TransactionId::new(),
                account_id: sender_id,
                kind: TransactionKind::TransferOut,
                amount,
                occurred_at: now,
                counterparty: Some(receiver_id),
                transfer_group: Some(transfer_group),
            },
        );
        state.history.append(
            receiver_id,
            TransactionRecord {
                id: TransactionId::new(),
                account_id: receiver_id,
                kind: TransactionKind::TransferIn,
                amount,
                occurred_at: now,
                counterparty: Some(sender_id),
                transfer_group: Some(transfer_group),
            },
        );

        let receipt = TransferReceipt {
            transfer_group,
            sender: AccountSnapshot {
                id: sender_id,
                currency: sender_currency,
                balance: to_major_units(sender_balance),
            },
            receiver: AccountSnapshot {
                id: receiver_id,
                currency: receiver_currency,
                balance: to_major_units(receiver_balance),
            },
        };
        if let Some(key) = key {
            state
                .idempotency
                .insert(key, CachedOutcome::Transfer(receipt.clone()));
        }

        tracing::debug!(
            sender = %sender_id,
            receiver = %receiver_id,
            amount,
            group = %transfer_group,
            "transferred funds"
        );
        Ok(receipt)
    }

    /// Account snapshot plus its full ordered transaction history.
    ///
    /// Read-only; bypasses the idempotency cache entirely.
    pub fn wallet_details(&self, account_id: AccountId) -> LedgerResult<WalletDetails> {
        let state = self.read();
        let account = state
            .accounts
            .get(account_id)
            .ok_or_else(|| LedgerError::not_found(format!("account {account_id} does not exist")))?;

        Ok(WalletDetails {
            account: snapshot(account),
            transactions: state.history.history_of(account_id).to_vec(),
        })
    }
}

fn snapshot(account: &Account) -> AccountSnapshot {
    AccountSnapshot {
        id: account.id,
        currency: account.currency,
        balance: to_major_units(account.balance_minor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> LedgerEngine {
        LedgerEngine::new()
    }

    fn key(token: &str) -> Option<IdempotencyKey> {
        Some(IdempotencyKey::from(token))
    }

    fn funded_account(engine: &LedgerEngine, currency: Currency, amount: u64) -> AccountId {
        let id = engine.open_account(Some(currency)).id;
        if amount > 0 {
            engine.fund_wallet(id, amount, None).unwrap();
        }
        id
    }

    #[test]
    fn open_account_defaults_currency_and_starts_empty() {
        let engine = engine();
        let account = engine.open_account(None);

        assert_eq!(account.currency, Currency::Usd);
        assert_eq!(account.balance, 0);

        let details = engine.wallet_details(account.id).unwrap();
        assert_eq!(details.account, account);
        assert!(details.transactions.is_empty());
    }

    #[test]
    fn funding_credits_balance_and_appends_one_record() {
        let engine = engine();
        let id = engine.open_account(None).id;

        let receipt = engine.fund_wallet(id, 1000, None).unwrap();
        assert_eq!(receipt.account.balance, 1000);

        let details = engine.wallet_details(id).unwrap();
        assert_eq!(details.account.balance, 1000);
        assert_eq!(details.transactions.len(), 1);

        let record = &details.transactions[0];
        assert_eq!(record.kind, TransactionKind::Fund);
        assert_eq!(record.amount, 1000);
        assert_eq!(record.account_id, id);
        assert_eq!(record.counterparty, None);
        assert_eq!(record.transfer_group, None);
    }

    #[test]
    fn funding_unknown_account_is_not_found() {
        let engine = engine();
        let err = engine.fund_wallet(AccountId::new(), 100, None).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn transfer_moves_value_and_links_both_records() {
        let engine = engine();
        let a = funded_account(&engine, Currency::Usd, 1000);
        let b = engine.open_account(Some(Currency::Usd)).id;

        let receipt = engine.transfer_funds(a, b, 500, None).unwrap();
        assert_eq!(receipt.sender.balance, 500);
        assert_eq!(receipt.receiver.balance, 500);

        let sender = engine.wallet_details(a).unwrap();
        let receiver = engine.wallet_details(b).unwrap();
        assert_eq!(sender.account.balance, 500);
        assert_eq!(receiver.account.balance, 500);

        let kinds: Vec<TransactionKind> =
            sender.transactions.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![TransactionKind::Fund, TransactionKind::TransferOut]);
        assert_eq!(receiver.transactions.len(), 1);

        let out = &sender.transactions[1];
        let incoming = &receiver.transactions[0];
        assert_eq!(incoming.kind, TransactionKind::TransferIn);
        assert_eq!(out.amount, 500);
        assert_eq!(incoming.amount, 500);
        assert_eq!(out.counterparty, Some(b));
        assert_eq!(incoming.counterparty, Some(a));
        assert_eq!(out.transfer_group, incoming.transfer_group);
        assert!(out.transfer_group.is_some());
        assert_eq!(Some(receipt.transfer_group), out.transfer_group);
    }

    #[test]
    fn self_transfer_is_a_conflict_even_for_unknown_accounts() {
        let engine = engine();
        let ghost = AccountId::new();

        let err = engine.transfer_funds(ghost, ghost, 100, None).unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[test]
    fn transfer_from_unknown_sender_is_not_found() {
        let engine = engine();
        let b = engine.open_account(None).id;

        let err = engine
            .transfer_funds(AccountId::new(), b, 100, None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn transfer_to_unknown_receiver_is_not_found() {
        let engine = engine();
        let a = funded_account(&engine, Currency::Usd, 100);

        let err = engine
            .transfer_funds(a, AccountId::new(), 100, None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn cross_currency_transfer_is_rejected_without_mutation() {
        let engine = engine();
        let a = funded_account(&engine, Currency::Usd, 100);
        let b = engine.open_account(Some(Currency::Eur)).id;

        let err = engine.transfer_funds(a, b, 50, None).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOperation(_)));

        assert_eq!(engine.wallet_details(a).unwrap().account.balance, 100);
        assert_eq!(engine.wallet_details(b).unwrap().account.balance, 0);
        assert_eq!(engine.wallet_details(b).unwrap().transactions.len(), 0);
    }

    #[test]
    fn insufficient_funds_leaves_both_balances_unchanged() {
        let engine = engine();
        let a = funded_account(&engine, Currency::Usd, 100);
        let b = engine.open_account(Some(Currency::Usd)).id;

        let err = engine.transfer_funds(a, b, 101, None).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds(_)));

        assert_eq!(engine.wallet_details(a).unwrap().account.balance, 100);
        assert_eq!(engine.wallet_details(b).unwrap().account.balance, 0);
        assert_eq!(engine.wallet_details(a).unwrap().transactions.len(), 1);
    }

    #[test]
    fn transfer_of_exact_balance_succeeds() {
        let engine = engine();
        let a = funded_account(&engine, Currency::Usd, 100);
        let b = engine.open_account(Some(Currency::Usd)).id;

        let receipt = engine.transfer_funds(a, b, 100, None).unwrap();
        assert_eq!(receipt.sender.balance, 0);
        assert_eq!(receipt.receiver.balance, 100);
    }

    #[test]
    fn duplicate_fund_with_same_key_replays_without_side_effects() {
        let engine = engine();
        let id = engine.open_account(None).id;

        let first = engine.fund_wallet(id, 100, key("fund-1")).unwrap();
        let second = engine.fund_wallet(id, 100, key("fund-1")).unwrap();

        assert_eq!(first, second);

        let details = engine.wallet_details(id).unwrap();
        assert_eq!(details.account.balance, 100);
        assert_eq!(details.transactions.len(), 1);
    }

    #[test]
    fn replayed_fund_ignores_changed_arguments() {
        let engine = engine();
        let id = engine.open_account(None).id;

        let first = engine.fund_wallet(id, 100, key("fund-1")).unwrap();
        // The gate is keyed on the token alone; the original receipt comes
        // back even when the retried amount differs.
        let second = engine.fund_wallet(id, 999, key("fund-1")).unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.wallet_details(id).unwrap().account.balance, 100);
    }

    #[test]
    fn duplicate_transfer_with_same_key_replays_without_side_effects() {
        let engine = engine();
        let a = funded_account(&engine, Currency::Usd, 1000);
        let b = engine.open_account(Some(Currency::Usd)).id;

        let first = engine.transfer_funds(a, b, 400, key("tx-1")).unwrap();
        let second = engine.transfer_funds(a, b, 400, key("tx-1")).unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.wallet_details(a).unwrap().account.balance, 600);
        assert_eq!(engine.wallet_details(b).unwrap().account.balance, 400);
        assert_eq!(engine.wallet_details(a).unwrap().transactions.len(), 2);
        assert_eq!(engine.wallet_details(b).unwrap().transactions.len(), 1);
    }

    #[test]
    fn funding_without_key_executes_every_time() {
        let engine = engine();
        let id = engine.open_account(None).id;

        engine.fund_wallet(id, 100, None).unwrap();
        engine.fund_wallet(id, 100, None).unwrap();

        let details = engine.wallet_details(id).unwrap();
        assert_eq!(details.account.balance, 200);
        assert_eq!(details.transactions.len(), 2);
    }

    #[test]
    fn key_reused_across_operation_kinds_is_a_conflict() {
        let engine = engine();
        let a = funded_account(&engine, Currency::Usd, 1000);
        let b = engine.open_account(Some(Currency::Usd)).id;

        engine.fund_wallet(a, 100, key("shared")).unwrap();
        let err = engine.transfer_funds(a, b, 100, key("shared")).unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        // And the other way around.
        engine.transfer_funds(a, b, 100, key("tx-only")).unwrap();
        let err = engine.fund_wallet(a, 100, key("tx-only")).unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[test]
    fn details_of_unknown_account_is_not_found() {
        let engine = engine();
        let err = engine.wallet_details(AccountId::new()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of transfers between two accounts
        /// conserves their combined balance; attempts beyond the sender's
        /// balance fail cleanly.
        #[test]
        fn transfers_conserve_total_balance(
            initial_a in 0u64..1_000_000,
            initial_b in 0u64..1_000_000,
            amounts in prop::collection::vec((any::<bool>(), 1u64..2_000_000), 1..20)
        ) {
            let engine = LedgerEngine::new();
            let a = funded_account(&engine, Currency::Usd, initial_a);
            let b = funded_account(&engine, Currency::Usd, initial_b);
            let total = initial_a + initial_b;

            for (a_sends, amount) in amounts {
                let (from, to) = if a_sends { (a, b) } else { (b, a) };
                let sender_balance = engine.wallet_details(from).unwrap().account.balance;

                let result = engine.transfer_funds(from, to, amount, None);
                if amount <= sender_balance {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert!(matches!(result, Err(LedgerError::InsufficientFunds(_))));
                }

                let balance_a = engine.wallet_details(a).unwrap().account.balance;
                let balance_b = engine.wallet_details(b).unwrap().account.balance;
                prop_assert_eq!(balance_a + balance_b, total);
            }
        }

        /// Property: funding accumulates exactly, one record per call.
        #[test]
        fn funding_accumulates_exactly(
            amounts in prop::collection::vec(1u64..1_000_000, 1..20)
        ) {
            let engine = LedgerEngine::new();
            let id = engine.open_account(None).id;

            let mut expected = 0u64;
            for amount in &amounts {
                let receipt = engine.fund_wallet(id, *amount, None).unwrap();
                expected += amount;
                prop_assert_eq!(receipt.account.balance, expected);
            }

            let details = engine.wallet_details(id).unwrap();
            prop_assert_eq!(details.account.balance, expected);
            prop_assert_eq!(details.transactions.len(), amounts.len());
        }
    }
}
