//! Ledger service actor with channel-based communication
//!
//! Owns one store and one reconciler for the session's active account and
//! serializes every operation through a command channel. This is the
//! embedding surface for a dashboard: submissions and status updates go in
//! as commands, the reconciled position comes back out on a watch channel.

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ledger::reconciler::PositionReconciler;
use crate::ledger::store::TransactionStore;
use crate::ledger::types::{Position, SubmitError, Transaction, TransactionKind, TransactionStatus};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Ledger service commands
#[derive(Debug)]
pub enum LedgerCommand {
    Submit {
        vault_id: String,
        kind: TransactionKind,
        amount: String,
        wallet_address: String,
        response: oneshot::Sender<Result<Uuid, SubmitError>>,
    },
    SetStatus {
        id: Uuid,
        status: TransactionStatus,
        response: oneshot::Sender<()>,
    },
    Dismiss {
        id: Uuid,
        response: oneshot::Sender<()>,
    },
    GetTransactions {
        response: oneshot::Sender<Vec<Transaction>>,
    },
    GetPosition {
        response: oneshot::Sender<Position>,
    },
    SetAccount {
        vault_id: String,
        wallet_address: String,
        response: oneshot::Sender<()>,
    },
    Shutdown {
        response: oneshot::Sender<()>,
    },
}

/// Cloneable handle to a running ledger service
#[derive(Clone)]
pub struct LedgerHandle {
    command_tx: mpsc::Sender<LedgerCommand>,
    position_rx: watch::Receiver<Position>,
}

impl LedgerHandle {
    pub async fn submit(
        &self,
        vault_id: &str,
        kind: TransactionKind,
        amount: &str,
        wallet_address: &str,
    ) -> Result<Uuid> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::Submit {
            vault_id: vault_id.to_string(),
            kind,
            amount: amount.to_string(),
            wallet_address: wallet_address.to_string(),
            response: tx,
        })
        .await?;
        let submitted = rx.await.context("Ledger service dropped the request")?;
        Ok(submitted?)
    }

    pub async fn set_status(&self, id: Uuid, status: TransactionStatus) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::SetStatus {
            id,
            status,
            response: tx,
        })
        .await?;
        rx.await.context("Ledger service dropped the request")
    }

    pub async fn dismiss(&self, id: Uuid) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::Dismiss { id, response: tx }).await?;
        rx.await.context("Ledger service dropped the request")
    }

    /// Records for the active account, in submission order
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::GetTransactions { response: tx })
            .await?;
        rx.await.context("Ledger service dropped the request")
    }

    pub async fn position(&self) -> Result<Position> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::GetPosition { response: tx }).await?;
        rx.await.context("Ledger service dropped the request")
    }

    /// Switch the active (vault, wallet) pair; the position restarts from a
    /// clean slate and is recomputed immediately.
    pub async fn set_account(&self, vault_id: &str, wallet_address: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::SetAccount {
            vault_id: vault_id.to_string(),
            wallet_address: wallet_address.to_string(),
            response: tx,
        })
        .await?;
        rx.await.context("Ledger service dropped the request")
    }

    /// Tear the service down, e.g. on logout
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::Shutdown { response: tx }).await?;
        rx.await.context("Ledger service dropped the request")
    }

    /// Watch the reconciled position for the active account
    pub fn position_watch(&self) -> watch::Receiver<Position> {
        self.position_rx.clone()
    }

    async fn send(&self, command: LedgerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .context("Ledger service is not running")
    }
}

/// Ledger service actor
pub struct LedgerService {
    store: TransactionStore,
    reconciler: PositionReconciler,
    command_rx: mpsc::Receiver<LedgerCommand>,
    position_tx: watch::Sender<Position>,
}

impl LedgerService {
    /// Spawn the service for an active account over an opened store.
    /// Returns the handle and the task driving the actor.
    pub fn spawn(
        store: TransactionStore,
        vault_id: &str,
        wallet_address: &str,
    ) -> (LedgerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let mut reconciler = PositionReconciler::new(vault_id, wallet_address);
        let initial = reconciler.reconcile(&store);
        let (position_tx, position_rx) = watch::channel(initial);

        let service = Self {
            store,
            reconciler,
            command_rx,
            position_tx,
        };
        let task = tokio::spawn(service.run());

        (
            LedgerHandle {
                command_tx,
                position_rx,
            },
            task,
        )
    }

    async fn run(mut self) {
        info!(
            vault_id = %self.reconciler.position().vault_id,
            "Ledger service started"
        );

        while let Some(command) = self.command_rx.recv().await {
            if self.handle_command(command) {
                break;
            }
        }

        info!("Ledger service stopped");
    }

    /// Returns true when the service should shut down
    fn handle_command(&mut self, command: LedgerCommand) -> bool {
        match command {
            LedgerCommand::Submit {
                vault_id,
                kind,
                amount,
                wallet_address,
                response,
            } => {
                let result = self
                    .store
                    .create(&vault_id, kind, &amount, &wallet_address);
                self.publish();
                let _ = response.send(result);
            }
            LedgerCommand::SetStatus {
                id,
                status,
                response,
            } => {
                self.store.update_status(id, status);
                self.publish();
                let _ = response.send(());
            }
            LedgerCommand::Dismiss { id, response } => {
                self.store.remove(id);
                self.publish();
                let _ = response.send(());
            }
            LedgerCommand::GetTransactions { response } => {
                let position = self.reconciler.position();
                let transactions = self
                    .store
                    .query(&position.vault_id, &position.wallet_address);
                let _ = response.send(transactions);
            }
            LedgerCommand::GetPosition { response } => {
                let position = self.reconciler.reconcile(&self.store);
                let _ = response.send(position);
            }
            LedgerCommand::SetAccount {
                vault_id,
                wallet_address,
                response,
            } => {
                debug!(vault_id = %vault_id, "Switching active account");
                self.reconciler.reset(vault_id, wallet_address);
                self.publish();
                let _ = response.send(());
            }
            LedgerCommand::Shutdown { response } => {
                let _ = response.send(());
                return true;
            }
        }
        false
    }

    /// Recompute and broadcast the position after any change
    fn publish(&mut self) {
        let position = self.reconciler.reconcile(&self.store);
        self.position_tx.send_replace(position);
    }
}
