//! Ledger persistence layer
//!
//! The whole transaction collection lives in one JSON document under the
//! data directory and is rewritten on every mutation. Wire records keep the
//! camelCase field names of the dashboard's storage namespace, so documents
//! written by older clients stay readable.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ledger::types::{Transaction, TransactionKind, TransactionStatus};

/// File name of the ledger document inside the data directory
pub const LEDGER_FILE: &str = "ledger.json";

/// Wire form of a transaction record
///
/// `estimatedApprovalTime` is optional: records written before the SLA
/// estimate existed carry no such field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRecord {
    id: Uuid,
    vault_id: String,
    amount: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    status: TransactionStatus,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    estimated_approval_time: Option<DateTime<Utc>>,
    wallet_address: String,
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            vault_id: tx.vault_id.clone(),
            amount: tx.amount.clone(),
            kind: tx.kind,
            status: tx.status,
            timestamp: tx.created_at,
            estimated_approval_time: tx.estimated_approval_at,
            wallet_address: tx.wallet_address.clone(),
        }
    }
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            vault_id: record.vault_id,
            wallet_address: record.wallet_address,
            kind: record.kind,
            amount: record.amount,
            status: record.status,
            created_at: record.timestamp,
            estimated_approval_at: record.estimated_approval_time,
        }
    }
}

/// Reads and writes the ledger document
#[derive(Debug, Clone)]
pub struct LedgerStorage {
    path: PathBuf,
}

impl LedgerStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger document located in the given data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(LEDGER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection.
    ///
    /// A missing document is an empty ledger. A document that fails to
    /// deserialize is discarded: the corrupt payload is unrecoverable and
    /// starting empty is the defined fallback.
    pub fn load(&self) -> Vec<Transaction> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Vec::new();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to read ledger document, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<TransactionRecord>>(&content) {
            Ok(records) => {
                let transactions: Vec<Transaction> =
                    records.into_iter().map(Transaction::from).collect();
                info!(
                    count = transactions.len(),
                    path = %self.path.display(),
                    "Loaded ledger document"
                );
                transactions
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Discarding corrupt ledger document");
                Vec::new()
            }
        }
    }

    /// Rewrite the whole document
    pub fn persist(&self, transactions: &[Transaction]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {:?}", parent))?;
        }

        let records: Vec<TransactionRecord> =
            transactions.iter().map(TransactionRecord::from).collect();
        let json = serde_json::to_string_pretty(&records)?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write ledger document: {:?}", self.path))?;

        Ok(())
    }
}
