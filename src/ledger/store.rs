//! Canonical transaction collection with durable persistence
//!
//! The store is the single owner of all submitted transactions. Every
//! mutation rewrites the ledger document before returning, so a crash right
//! after a submission cannot lose the record. Writes are best-effort: if the
//! document cannot be written the in-memory collection stays authoritative
//! for the session.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ledger::events::{LedgerEvent, EVENT_CHANNEL_CAPACITY};
use crate::ledger::storage::LedgerStorage;
use crate::ledger::types::{SubmitError, Transaction, TransactionKind, TransactionStatus};

/// Default approval SLA communicated to the user at submission time.
/// Informational only; nothing is enforced when it elapses.
pub const DEFAULT_APPROVAL_SLA_HOURS: i64 = 24;

/// Owner of the canonical transaction collection
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    storage: LedgerStorage,
    events: broadcast::Sender<LedgerEvent>,
    approval_sla: Duration,
}

impl TransactionStore {
    /// Open the store over a ledger document, loading whatever it holds.
    /// A corrupt or missing document yields an empty collection.
    pub fn open(storage: LedgerStorage) -> Self {
        let transactions = storage.load();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            transactions,
            storage,
            events,
            approval_sla: Duration::hours(DEFAULT_APPROVAL_SLA_HOURS),
        }
    }

    /// Override the approval SLA used for the submission estimate
    pub fn with_approval_sla(mut self, sla: Duration) -> Self {
        self.approval_sla = sla;
        self
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Submit a new transaction request.
    ///
    /// The amount must parse as a strictly positive decimal; everything else
    /// about the request is taken as given (the caller is expected to have
    /// verified the wallet). The new record is persisted before returning.
    pub fn create(
        &mut self,
        vault_id: &str,
        kind: TransactionKind,
        amount: &str,
        wallet_address: &str,
    ) -> Result<Uuid, SubmitError> {
        if vault_id.trim().is_empty() {
            return Err(SubmitError::EmptyVaultId);
        }
        if wallet_address.trim().is_empty() {
            return Err(SubmitError::EmptyWalletAddress);
        }

        let parsed = amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_| SubmitError::AmountNotNumeric(amount.to_string()))?;
        if parsed <= Decimal::ZERO {
            return Err(SubmitError::AmountNotPositive(parsed));
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            vault_id: vault_id.to_string(),
            wallet_address: wallet_address.to_string(),
            kind,
            amount: amount.trim().to_string(),
            status: TransactionStatus::Pending,
            created_at: now,
            estimated_approval_at: Some(now + self.approval_sla),
        };
        let id = transaction.id;

        info!(
            id = %id,
            vault_id = %vault_id,
            kind = %kind.as_str(),
            amount = %transaction.amount,
            "Submitted transaction"
        );

        self.transactions.push(transaction);
        self.persist();
        let _ = self.events.send(LedgerEvent::Created { id });

        Ok(id)
    }

    /// Apply a status decided by the approval authority.
    ///
    /// Any status may follow any other; the authority is free to skip
    /// intermediate states. An unknown id is a no-op, and repeating the
    /// current status is a no-op as well.
    pub fn update_status(&mut self, id: Uuid, status: TransactionStatus) {
        let Some(transaction) = self.transactions.iter_mut().find(|t| t.id == id) else {
            debug!(id = %id, "Status update for unknown transaction ignored");
            return;
        };

        if transaction.status == status {
            return;
        }

        info!(
            id = %id,
            from = %transaction.status.as_str(),
            to = %status.as_str(),
            "Transaction status changed"
        );
        transaction.status = status;

        self.persist();
        let _ = self.events.send(LedgerEvent::StatusChanged { id, status });
    }

    /// Dismiss a record. Idempotent; meant for settled records but never
    /// fails for in-flight ones.
    pub fn remove(&mut self, id: Uuid) {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            debug!(id = %id, "Dismissal of unknown transaction ignored");
            return;
        }

        info!(id = %id, "Transaction dismissed");
        self.persist();
        let _ = self.events.send(LedgerEvent::Removed { id });
    }

    /// All records for one (vault, wallet) pair, in submission order.
    /// Wallet addresses match case-insensitively.
    pub fn query(&self, vault_id: &str, wallet_address: &str) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.matches_account(vault_id, wallet_address))
            .cloned()
            .collect()
    }

    /// The full collection, in submission order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Rewrite the ledger document. A failed write leaves the in-memory
    /// collection authoritative for the rest of the session.
    fn persist(&self) {
        if let Err(err) = self.storage.persist(&self.transactions) {
            warn!(error = %err, "Ledger write failed, continuing in-memory only");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::storage::LedgerStorage;
    use tempfile::TempDir;

    fn open_store() -> (TransactionStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TransactionStore::open(LedgerStorage::in_dir(dir.path()));
        (store, dir)
    }

    #[test]
    fn test_create_starts_pending_with_sla_estimate() {
        let (mut store, _dir) = open_store();

        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();

        let tx = store.get(id).unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.amount, "0.01");
        let eta = tx.estimated_approval_at.unwrap();
        assert_eq!(eta - tx.created_at, Duration::hours(24));
    }

    #[test]
    fn test_create_rejects_bad_amounts() {
        let (mut store, _dir) = open_store();

        assert!(matches!(
            store.create("v1", TransactionKind::Deposit, "abc", "0xabc"),
            Err(SubmitError::AmountNotNumeric(_))
        ));
        assert!(matches!(
            store.create("v1", TransactionKind::Deposit, "0", "0xabc"),
            Err(SubmitError::AmountNotPositive(_))
        ));
        assert!(matches!(
            store.create("v1", TransactionKind::Withdrawal, "-0.5", "0xabc"),
            Err(SubmitError::AmountNotPositive(_))
        ));
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_create_persists_before_returning() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TransactionStore::open(LedgerStorage::in_dir(dir.path()));
        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();

        // A second store over the same document sees the record
        let reopened = TransactionStore::open(LedgerStorage::in_dir(dir.path()));
        assert!(reopened.get(id).is_some());
    }

    #[test]
    fn test_update_status_unknown_id_is_noop() {
        let (mut store, _dir) = open_store();
        store.update_status(Uuid::new_v4(), TransactionStatus::Approved);
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_update_status_allows_arbitrary_transitions() {
        let (mut store, _dir) = open_store();
        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();

        // The approval authority may skip or even revert states
        store.update_status(id, TransactionStatus::Approved);
        assert_eq!(store.get(id).unwrap().status, TransactionStatus::Approved);
        store.update_status(id, TransactionStatus::Pending);
        assert_eq!(store.get(id).unwrap().status, TransactionStatus::Pending);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut store, _dir) = open_store();
        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();

        store.remove(id);
        assert!(store.get(id).is_none());
        store.remove(id);
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_query_matches_wallet_case_insensitively() {
        let (mut store, _dir) = open_store();
        store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        store
            .create("v2", TransactionKind::Deposit, "0.02", "0xabc")
            .unwrap();

        let matched = store.query("v1", "0xABC");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].vault_id, "v1");
    }

    #[test]
    fn test_query_preserves_submission_order() {
        let (mut store, _dir) = open_store();
        let first = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        let second = store
            .create("v1", TransactionKind::Withdrawal, "0.02", "0xabc")
            .unwrap();

        let matched = store.query("v1", "0xabc");
        assert_eq!(matched[0].id, first);
        assert_eq!(matched[1].id, second);
    }

    #[test]
    fn test_mutations_emit_events() {
        let (mut store, _dir) = open_store();
        let mut rx = store.subscribe();

        let id = store
            .create("v1", TransactionKind::Deposit, "0.01", "0xabc")
            .unwrap();
        store.update_status(id, TransactionStatus::Approved);
        // Repeating the current status is not a change
        store.update_status(id, TransactionStatus::Approved);
        store.remove(id);

        assert_eq!(rx.try_recv().unwrap(), LedgerEvent::Created { id });
        assert_eq!(
            rx.try_recv().unwrap(),
            LedgerEvent::StatusChanged {
                id,
                status: TransactionStatus::Approved
            }
        );
        assert_eq!(rx.try_recv().unwrap(), LedgerEvent::Removed { id });
        assert!(rx.try_recv().is_err());
    }
}
