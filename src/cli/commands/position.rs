use anyhow::Result;
use clap::Args;

use crate::config::LedgerConfig;
use crate::data_paths::DataPaths;
use crate::ledger::display::PositionFormatter;
use crate::ledger::reconciler::PositionReconciler;
use crate::ledger::storage::LedgerStorage;
use crate::ledger::store::TransactionStore;

#[derive(Args, Clone)]
pub struct PositionArgs {
    /// Vault ID
    pub vault_id: String,

    /// Wallet address (matched case-insensitively)
    #[arg(long)]
    pub wallet: String,
}

pub struct PositionCommand {
    args: PositionArgs,
}

impl PositionCommand {
    pub fn new(args: PositionArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &LedgerConfig, data_paths: DataPaths) -> Result<()> {
        let store = TransactionStore::open(LedgerStorage::new(data_paths.ledger_file()));

        // A fresh reconciler folds every approved record for this account
        // exactly once within this invocation
        let mut reconciler = PositionReconciler::new(&self.args.vault_id, &self.args.wallet)
            .with_precision(config.amount_precision);
        let position = reconciler.reconcile(&store);

        print!(
            "{}",
            PositionFormatter::new(&position, config.btc_usd_rate).format_summary()
        );

        Ok(())
    }
}
