//! Ledger type definitions with strong typing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a fund movement request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = SubmitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(SubmitError::UnknownKind(other.to_string())),
        }
    }
}

/// Approval lifecycle status, assigned by the fund-manager back office
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
}

impl TransactionStatus {
    /// Terminal statuses are the only ones a user is expected to dismiss
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Approved | TransactionStatus::Rejected
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "processing" => Ok(TransactionStatus::Processing),
            "approved" => Ok(TransactionStatus::Approved),
            "rejected" => Ok(TransactionStatus::Rejected),
            other => Err(anyhow::anyhow!("unknown transaction status: {}", other)),
        }
    }
}

/// A submitted fund movement request tracked through its approval lifecycle
///
/// Everything except `status` is immutable after creation. The amount is
/// carried as the submitted decimal string and parsed where arithmetic
/// happens; creation guarantees it parsed as a strictly positive decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub vault_id: String,
    pub wallet_address: String,
    pub kind: TransactionKind,
    pub amount: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub estimated_approval_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Parse the recorded amount, if it still parses
    pub fn amount_decimal(&self) -> Option<Decimal> {
        self.amount.trim().parse::<Decimal>().ok()
    }

    /// Whether this record belongs to the given (vault, wallet) pair.
    /// Wallet addresses compare case-insensitively.
    pub fn matches_account(&self, vault_id: &str, wallet_address: &str) -> bool {
        self.vault_id == vault_id && self.wallet_address.eq_ignore_ascii_case(wallet_address)
    }
}

/// Validation failure at the submission boundary
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("amount {0:?} is not a decimal number")]
    AmountNotNumeric(String),
    #[error("amount {0} must be positive")]
    AmountNotPositive(Decimal),
    #[error("unknown transaction kind: {0}")]
    UnknownKind(String),
    #[error("vault id must not be empty")]
    EmptyVaultId,
    #[error("wallet address must not be empty")]
    EmptyWalletAddress,
}

/// Derived balance for one (vault, wallet) pair
///
/// Never persisted; rebuilt by the reconciler from approved transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub vault_id: String,
    pub wallet_address: String,
    pub balance: Decimal,
    pub has_ever_deposited: bool,
    pub last_updated: DateTime<Utc>,
}

impl Position {
    pub fn new(vault_id: impl Into<String>, wallet_address: impl Into<String>) -> Self {
        Self {
            vault_id: vault_id.into(),
            wallet_address: wallet_address.into(),
            balance: Decimal::ZERO,
            has_ever_deposited: false,
            last_updated: Utc::now(),
        }
    }

    /// Secondary-currency projection of the balance at a conversion rate
    pub fn display_value(&self, rate: Decimal) -> Decimal {
        (self.balance * rate).round_dp(2)
    }
}
