//! Display formatting for transactions and positions

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::ledger::types::{Position, Transaction, TransactionKind, TransactionStatus};

/// Format a transaction list as a table
pub struct TransactionsFormatter<'a> {
    pub transactions: &'a [Transaction],
}

impl<'a> TransactionsFormatter<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self { transactions }
    }

    pub fn format_table(&self) -> String {
        if self.transactions.is_empty() {
            return "No transactions found.\n".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Id", "Vault", "Kind", "Amount", "Status", "Submitted", "Est. Approval",
            ]);

        for tx in self.transactions {
            let id = tx.id.to_string();
            let id_short = format!("{}...", &id[..8]);

            let kind_display = match tx.kind {
                TransactionKind::Deposit => tx.kind.as_str().bright_green().to_string(),
                TransactionKind::Withdrawal => tx.kind.as_str().bright_red().to_string(),
            };

            let status_display = match tx.status {
                TransactionStatus::Pending => tx.status.as_str().bright_yellow().to_string(),
                TransactionStatus::Processing => tx.status.as_str().bright_cyan().to_string(),
                TransactionStatus::Approved => tx.status.as_str().bright_green().to_string(),
                TransactionStatus::Rejected => tx.status.as_str().bright_red().to_string(),
            };

            let eta = tx
                .estimated_approval_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                id_short,
                tx.vault_id.clone(),
                kind_display,
                format_btc_amount(tx),
                status_display,
                tx.created_at.format("%Y-%m-%d %H:%M").to_string(),
                eta,
            ]);
        }

        format!("{}\n", table)
    }
}

/// Format a reconciled position summary
pub struct PositionFormatter<'a> {
    pub position: &'a Position,
    pub rate: Decimal,
}

impl<'a> PositionFormatter<'a> {
    pub fn new(position: &'a Position, rate: Decimal) -> Self {
        Self { position, rate }
    }

    pub fn format_summary(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Vault:    {}\n",
            self.position.vault_id.bright_cyan()
        ));
        output.push_str(&format!("Wallet:   {}\n", self.position.wallet_address));
        output.push_str(&format!(
            "Balance:  {} BTC\n",
            format!("{:.8}", self.position.balance).bright_green()
        ));
        output.push_str(&format!(
            "Value:    ${:.2}\n",
            self.position.display_value(self.rate)
        ));

        if !self.position.has_ever_deposited {
            output.push_str(&format!(
                "\n{}\n",
                "No settled deposits yet.".bright_black()
            ));
        }

        output
    }
}

fn format_btc_amount(tx: &Transaction) -> String {
    match tx.amount_decimal() {
        Some(amount) => format!("{:.8}", amount),
        // A record whose amount no longer parses still has to render
        None => format!("{} (?)", tx.amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_tx() -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            vault_id: "v1".to_string(),
            wallet_address: "0xabc".to_string(),
            kind: TransactionKind::Deposit,
            amount: "0.01".to_string(),
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            estimated_approval_at: None,
        }
    }

    #[test]
    fn test_empty_transaction_list() {
        let formatter = TransactionsFormatter::new(&[]);
        assert_eq!(formatter.format_table(), "No transactions found.\n");
    }

    #[test]
    fn test_transaction_table_contains_amount() {
        let transactions = vec![sample_tx()];
        let table = TransactionsFormatter::new(&transactions).format_table();
        assert!(table.contains("0.01000000"));
        assert!(table.contains("v1"));
    }

    #[test]
    fn test_position_summary() {
        let mut position = Position::new("v1", "0xabc");
        position.balance = dec!(0.5);
        position.has_ever_deposited = true;

        let summary = PositionFormatter::new(&position, dec!(60000)).format_summary();
        assert!(summary.contains("0.50000000"));
        assert!(summary.contains("$30000.00"));
        assert!(!summary.contains("No settled deposits"));
    }
}
