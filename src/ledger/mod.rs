//! Transaction ledger and position tracking
//!
//! This module tracks deposit and withdrawal requests through their
//! approval lifecycle, persists them across sessions, and reconciles
//! approved transactions into the displayed vault balance exactly once.

pub mod display;
pub mod events;
pub mod reconciler;
pub mod service;
pub mod storage;
pub mod store;
pub mod types;

pub use events::LedgerEvent;
pub use reconciler::PositionReconciler;
pub use service::{LedgerHandle, LedgerService};
pub use storage::LedgerStorage;
pub use store::TransactionStore;
pub use types::{
    Position, SubmitError, Transaction, TransactionKind, TransactionStatus,
};
