//! Change notifications emitted by the transaction store
//!
//! The store broadcasts an event after every effective mutation so that
//! dependent views and the reconciler can recompute without polling.

use uuid::Uuid;

use crate::ledger::types::TransactionStatus;

/// Capacity of the broadcast channel backing store subscriptions.
/// A slow subscriber past this many unseen events observes a lag error
/// and should re-query the store.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A mutation that actually changed the transaction collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A new transaction was submitted
    Created { id: Uuid },
    /// A transaction moved to a different status
    StatusChanged {
        id: Uuid,
        status: TransactionStatus,
    },
    /// A transaction was dismissed
    Removed { id: Uuid },
}

impl LedgerEvent {
    /// The transaction this event refers to
    pub fn transaction_id(&self) -> Uuid {
        match self {
            LedgerEvent::Created { id } => *id,
            LedgerEvent::StatusChanged { id, .. } => *id,
            LedgerEvent::Removed { id } => *id,
        }
    }
}
