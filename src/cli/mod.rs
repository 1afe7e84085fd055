//! CLI module for the vault ledger
//!
//! Operator command-line surface over the transaction store. In production
//! the status-update operation belongs to the fund-manager back office;
//! this CLI stands in for it during development and support work, and
//! doubles as a submission/inspection tool.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::config::LedgerConfig;
use crate::data_paths::DataPaths;
use crate::logging::{init_logging, LogMode, LoggingConfig};

use commands::dismiss::{DismissArgs, DismissCommand};
use commands::position::{PositionArgs, PositionCommand};
use commands::set_status::{SetStatusArgs, SetStatusCommand};
use commands::submit::{SubmitArgs, SubmitCommand};
use commands::transactions::{TransactionsArgs, TransactionsCommand};
use commands::version::{VersionArgs, VersionCommand};

#[derive(Parser)]
#[command(name = "vaultledger")]
#[command(version)]
#[command(about = "Client-side ledger for BTC vault deposit and withdrawal requests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path (default: the per-user data directory)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a deposit or withdrawal request
    Submit(SubmitArgs),

    /// Apply an approval-authority status to a transaction
    SetStatus(SetStatusArgs),

    /// List transactions for a (vault, wallet) pair
    Transactions(TransactionsArgs),

    /// Show the reconciled position for a (vault, wallet) pair
    Position(PositionArgs),

    /// Dismiss a settled transaction
    Dismiss(DismissArgs),

    /// Show version information
    Version(VersionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        if self.verbose > 0 && std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "debug");
        }

        let data_paths = match &self.data_dir {
            Some(dir) => DataPaths::new(dir),
            None => DataPaths::user_default(),
        };
        data_paths.ensure_directories()?;
        init_logging(LoggingConfig::new(LogMode::ConsoleAndFile, data_paths.clone()))?;

        let config = LedgerConfig::load(&data_paths)?;

        match self.command {
            Commands::Submit(args) => SubmitCommand::new(args).execute(&config, data_paths).await,
            Commands::SetStatus(args) => {
                SetStatusCommand::new(args).execute(&config, data_paths).await
            }
            Commands::Transactions(args) => {
                TransactionsCommand::new(args).execute(&config, data_paths).await
            }
            Commands::Position(args) => {
                PositionCommand::new(args).execute(&config, data_paths).await
            }
            Commands::Dismiss(args) => {
                DismissCommand::new(args).execute(&config, data_paths).await
            }
            Commands::Version(args) => {
                VersionCommand::new(args).execute(&config, data_paths).await
            }
        }
    }
}
