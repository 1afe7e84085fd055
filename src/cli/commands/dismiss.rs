use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::warn;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::data_paths::DataPaths;
use crate::ledger::storage::LedgerStorage;
use crate::ledger::store::TransactionStore;

#[derive(Args, Clone)]
pub struct DismissArgs {
    /// Transaction ID
    pub id: Uuid,
}

pub struct DismissCommand {
    args: DismissArgs,
}

impl DismissCommand {
    pub fn new(args: DismissArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, _config: &LedgerConfig, data_paths: DataPaths) -> Result<()> {
        let mut store = TransactionStore::open(LedgerStorage::new(data_paths.ledger_file()));

        match store.get(self.args.id) {
            Some(tx) if !tx.status.is_terminal() => {
                // Dismissal never fails, but in-flight records usually
                // disappear by mistake
                warn!(
                    id = %self.args.id,
                    status = %tx.status.as_str(),
                    "Dismissing a transaction that is still in flight"
                );
            }
            None => {
                println!(
                    "{} no transaction with id {}",
                    "!".bright_yellow(),
                    self.args.id
                );
                return Ok(());
            }
            _ => {}
        }

        store.remove(self.args.id);
        println!(
            "{} transaction {} dismissed",
            "✓".bright_green(),
            self.args.id.to_string().bright_cyan()
        );

        Ok(())
    }
}
