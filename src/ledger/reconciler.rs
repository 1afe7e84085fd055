//! Position reconciliation from approved transactions
//!
//! Folds newly approved transactions into the displayed balance exactly
//! once, no matter how many times reconciliation runs or how often the
//! approval authority repeats itself.

use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ledger::store::TransactionStore;
use crate::ledger::types::{Position, Transaction, TransactionKind, TransactionStatus};

/// Decimal places the folded balance is rounded to. Satoshi precision:
/// the vaults are denominated in a bitcoin-pegged asset.
pub const BALANCE_DECIMALS: u32 = 8;

/// Exactly-once folder of approved transactions into a Position
///
/// Owns the Position and the processed-id set for one active
/// (vault, wallet) pair. Only ever reads the store.
pub struct PositionReconciler {
    position: Position,
    processed: HashSet<Uuid>,
    precision: u32,
}

impl PositionReconciler {
    pub fn new(vault_id: impl Into<String>, wallet_address: impl Into<String>) -> Self {
        Self {
            position: Position::new(vault_id, wallet_address),
            processed: HashSet::new(),
            precision: BALANCE_DECIMALS,
        }
    }

    /// Override the rounding precision of the folded balance
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Switch to a different (vault, wallet) pair: fresh position, fresh
    /// processed set.
    pub fn reset(&mut self, vault_id: impl Into<String>, wallet_address: impl Into<String>) {
        self.position = Position::new(vault_id, wallet_address);
        self.processed.clear();
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Fold any approved-but-unprocessed transactions into the balance.
    ///
    /// Safe to call on every re-render: a transaction id enters the
    /// processed set the first time it is seen approved and never
    /// contributes again. An amount that no longer parses contributes zero
    /// but is still marked processed so it is never retried.
    pub fn reconcile(&mut self, store: &TransactionStore) -> Position {
        let transactions = store.query(&self.position.vault_id, &self.position.wallet_address);

        let mut deposits = Decimal::ZERO;
        let mut withdrawals = Decimal::ZERO;
        let mut newly_processed = 0usize;

        for tx in &transactions {
            if tx.status != TransactionStatus::Approved || self.processed.contains(&tx.id) {
                continue;
            }
            match tx.amount_decimal() {
                Some(amount) => match tx.kind {
                    TransactionKind::Deposit => deposits += amount,
                    TransactionKind::Withdrawal => withdrawals += amount,
                },
                None => {
                    warn!(
                        id = %tx.id,
                        amount = %tx.amount,
                        "Approved transaction has unparseable amount, contributes zero"
                    );
                }
            }
            self.processed.insert(tx.id);
            newly_processed += 1;
        }

        if newly_processed > 0 {
            self.apply(deposits, withdrawals, newly_processed);
        }

        self.position.clone()
    }

    fn apply(&mut self, deposits: Decimal, withdrawals: Decimal, count: usize) {
        let next = (self.position.balance + deposits - withdrawals)
            .max(Decimal::ZERO)
            .round_dp(self.precision);

        debug!(
            vault_id = %self.position.vault_id,
            processed = count,
            deposits = %deposits,
            withdrawals = %withdrawals,
            balance = %next,
            "Reconciled position"
        );

        self.position.balance = next;
        // The flag latches: a later drop to zero does not revert it
        if next > Decimal::ZERO {
            self.position.has_ever_deposited = true;
        }
        self.position.last_updated = chrono::Utc::now();
    }

    /// Ids already folded into the position
    pub fn processed_ids(&self) -> impl Iterator<Item = &Uuid> {
        self.processed.iter()
    }

    /// Whether a given transaction has been folded in
    pub fn has_processed(&self, transaction: &Transaction) -> bool {
        self.processed.contains(&transaction.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::storage::LedgerStorage;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn open_store() -> (TransactionStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TransactionStore::open(LedgerStorage::in_dir(dir.path()));
        (store, dir)
    }

    #[test]
    fn test_single_deposit_approval() {
        // Scenario: submit 0.01, approve, reconcile
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        assert_eq!(store.get(id).unwrap().status, TransactionStatus::Pending);

        store.update_status(id, TransactionStatus::Approved);
        let position = reconciler.reconcile(&store);

        assert_eq!(position.balance, dec!(0.01));
        assert!(position.has_ever_deposited);
    }

    #[test]
    fn test_two_deposits_sum_without_loss() {
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let a = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        let b = store
            .create("v1", TransactionKind::Deposit, "0.02", "0xabc")
            .unwrap();
        store.update_status(a, TransactionStatus::Approved);
        store.update_status(b, TransactionStatus::Approved);

        let position = reconciler.reconcile(&store);
        assert_eq!(position.balance, dec!(0.03));
    }

    #[test]
    fn test_redundant_approval_counts_once() {
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        store.update_status(id, TransactionStatus::Approved);
        reconciler.reconcile(&store);
        store.update_status(id, TransactionStatus::Approved);
        let position = reconciler.reconcile(&store);

        assert_eq!(position.balance, dec!(0.01));
    }

    #[test]
    fn test_reapproval_after_revert_counts_once() {
        // The authority may move approved -> pending -> approved; the
        // processed set still admits the id only once
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        store.update_status(id, TransactionStatus::Approved);
        reconciler.reconcile(&store);
        store.update_status(id, TransactionStatus::Pending);
        store.update_status(id, TransactionStatus::Approved);
        let position = reconciler.reconcile(&store);

        assert_eq!(position.balance, dec!(0.01));
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let id = store
            .create("v1", TransactionKind::Deposit, "0.5", "0xabc")
            .unwrap();
        store.update_status(id, TransactionStatus::Approved);

        let first = reconciler.reconcile(&store);
        let second = reconciler.reconcile(&store);
        assert_eq!(first, second);
    }

    #[test]
    fn test_withdrawal_clamps_at_zero() {
        // Approved withdrawal of 0.05 against a balance of 0.03
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let d = store
            .create("v1", TransactionKind::Deposit, "0.03", "0xabc")
            .unwrap();
        store.update_status(d, TransactionStatus::Approved);
        reconciler.reconcile(&store);

        let w = store
            .create("v1", TransactionKind::Withdrawal, "0.05", "0xabc")
            .unwrap();
        store.update_status(w, TransactionStatus::Approved);
        let position = reconciler.reconcile(&store);

        assert_eq!(position.balance, Decimal::ZERO);
        // The flag latched while the balance was positive
        assert!(position.has_ever_deposited);
    }

    #[test]
    fn test_rejected_and_pending_contribute_nothing() {
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let a = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        store
            .create("v1", TransactionKind::Deposit, "0.02", "0xabc")
            .unwrap();
        store.update_status(a, TransactionStatus::Rejected);

        let position = reconciler.reconcile(&store);
        assert_eq!(position.balance, Decimal::ZERO);
        assert!(!position.has_ever_deposited);
    }

    #[test]
    fn test_unparseable_amount_contributes_zero_once() {
        // An amount can only go bad through the persisted document; the
        // submission boundary rejects it. Plant one directly.
        let dir = tempfile::tempdir().unwrap();
        let storage = LedgerStorage::in_dir(dir.path());
        std::fs::write(
            storage.path(),
            r#"[{
                "id": "6f7cfa52-7d18-4f6e-a2a4-9b39ad9b2a64",
                "vaultId": "v1",
                "amount": "not-a-number",
                "type": "deposit",
                "status": "approved",
                "timestamp": "2024-03-01T12:00:00Z",
                "walletAddress": "0xabc"
            }]"#,
        )
        .unwrap();

        let store = TransactionStore::open(storage);
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let position = reconciler.reconcile(&store);
        assert_eq!(position.balance, Decimal::ZERO);
        // Marked processed anyway, never retried
        assert!(reconciler.has_processed(&store.transactions()[0]));
        let again = reconciler.reconcile(&store);
        assert_eq!(position, again);
    }

    #[test]
    fn test_reset_clears_position_and_processed_set() {
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        store.update_status(id, TransactionStatus::Approved);
        reconciler.reconcile(&store);

        reconciler.reset("v2", "0xdef");
        assert_eq!(reconciler.position().balance, Decimal::ZERO);
        assert_eq!(reconciler.processed_ids().count(), 0);

        // Switching back re-counts from a clean slate, still exactly once
        reconciler.reset("v1", "0xabc");
        let position = reconciler.reconcile(&store);
        assert_eq!(position.balance, dec!(0.01));
    }

    #[test]
    fn test_other_accounts_are_invisible() {
        let (mut store, _dir) = open_store();
        let mut reconciler = PositionReconciler::new("v1", "0xabc");

        let other = store
            .create("v2", TransactionKind::Deposit, "5", "0xabc")
            .unwrap();
        store.update_status(other, TransactionStatus::Approved);

        let position = reconciler.reconcile(&store);
        assert_eq!(position.balance, Decimal::ZERO);
    }
}
