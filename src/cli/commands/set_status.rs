use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::warn;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::data_paths::DataPaths;
use crate::ledger::storage::LedgerStorage;
use crate::ledger::store::TransactionStore;
use crate::ledger::types::TransactionStatus;

#[derive(Args, Clone)]
pub struct SetStatusArgs {
    /// Transaction ID
    pub id: Uuid,

    /// New status: pending, processing, approved or rejected
    pub status: TransactionStatus,
}

pub struct SetStatusCommand {
    args: SetStatusArgs,
}

impl SetStatusCommand {
    pub fn new(args: SetStatusArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, _config: &LedgerConfig, data_paths: DataPaths) -> Result<()> {
        let mut store = TransactionStore::open(LedgerStorage::new(data_paths.ledger_file()));

        // Unknown ids are a no-op by contract; tell the operator anyway
        if store.get(self.args.id).is_none() {
            warn!(id = %self.args.id, "No such transaction, nothing to update");
            println!("{} no transaction with id {}", "!".bright_yellow(), self.args.id);
            return Ok(());
        }

        store.update_status(self.args.id, self.args.status);

        println!(
            "{} transaction {} is now {}",
            "✓".bright_green(),
            self.args.id.to_string().bright_cyan(),
            self.args.status.as_str().bright_white().bold()
        );

        Ok(())
    }
}
