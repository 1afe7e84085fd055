use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::info;

use crate::config::LedgerConfig;
use crate::data_paths::DataPaths;
use crate::ledger::storage::LedgerStorage;
use crate::ledger::store::TransactionStore;
use crate::ledger::types::TransactionKind;

#[derive(Args, Clone)]
pub struct SubmitArgs {
    /// Vault ID
    pub vault_id: String,

    /// Request kind: deposit or withdrawal
    pub kind: TransactionKind,

    /// Amount in BTC (e.g. 0.01)
    pub amount: String,

    /// Wallet address the request is submitted for
    #[arg(long)]
    pub wallet: String,
}

pub struct SubmitCommand {
    args: SubmitArgs,
}

impl SubmitCommand {
    pub fn new(args: SubmitArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &LedgerConfig, data_paths: DataPaths) -> Result<()> {
        info!(
            vault_id = %self.args.vault_id,
            kind = %self.args.kind.as_str(),
            "Submitting transaction request"
        );

        let mut store = TransactionStore::open(LedgerStorage::new(data_paths.ledger_file()))
            .with_approval_sla(config.approval_sla());

        let id = store.create(
            &self.args.vault_id,
            self.args.kind,
            &self.args.amount,
            &self.args.wallet,
        )?;

        println!(
            "{} {} of {} BTC submitted",
            "✓".bright_green(),
            self.args.kind.as_str(),
            self.args.amount
        );
        println!("  Id: {}", id.to_string().bright_cyan());
        if let Some(eta) = store.get(id).and_then(|tx| tx.estimated_approval_at) {
            println!("  Estimated approval by {}", eta.format("%Y-%m-%d %H:%M UTC"));
        }

        Ok(())
    }
}
