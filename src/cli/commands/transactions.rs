use anyhow::Result;
use clap::Args;

use crate::config::LedgerConfig;
use crate::data_paths::DataPaths;
use crate::ledger::display::TransactionsFormatter;
use crate::ledger::storage::LedgerStorage;
use crate::ledger::store::TransactionStore;

#[derive(Args, Clone)]
pub struct TransactionsArgs {
    /// Vault ID
    pub vault_id: String,

    /// Wallet address (matched case-insensitively)
    #[arg(long)]
    pub wallet: String,

    /// Include every vault and wallet in the ledger
    #[arg(long)]
    pub all: bool,
}

pub struct TransactionsCommand {
    args: TransactionsArgs,
}

impl TransactionsCommand {
    pub fn new(args: TransactionsArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, _config: &LedgerConfig, data_paths: DataPaths) -> Result<()> {
        let store = TransactionStore::open(LedgerStorage::new(data_paths.ledger_file()));

        let transactions = if self.args.all {
            store.transactions().to_vec()
        } else {
            store.query(&self.args.vault_id, &self.args.wallet)
        };

        print!("{}", TransactionsFormatter::new(&transactions).format_table());

        Ok(())
    }
}
