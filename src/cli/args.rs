use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments
///
/// Option values can also come from the environment (`LEDGER_*`); explicit
/// flags win.
#[derive(Parser, Debug)]
#[command(name = "credit-ledger")]
#[command(about = "Replay credit ledger commands and report balances", long_about = None)]
pub struct CliArgs {
    /// Path to the input CSV file
    #[arg(value_name = "INPUT", help = "Path to the command CSV file")]
    pub input_file: PathBuf,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        env = "LEDGER_STRATEGY",
        help = "Replay strategy: 'sync' for one command at a time or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        env = "LEDGER_BATCH_SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        env = "LEDGER_MAX_CONCURRENT",
        help = "Maximum number of command groups running concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    #[arg(
        long = "journal",
        value_name = "PATH",
        env = "LEDGER_JOURNAL",
        help = "Persist transactions to a journal file instead of memory"
    )]
    pub journal: Option<PathBuf>,

    #[arg(
        long = "log-level",
        value_name = "FILTER",
        env = "LEDGER_LOG",
        default_value = "info",
        help = "Log filter directive, e.g. 'warn' or 'credit_ledger=debug'"
    )]
    pub log_level: String,

    #[arg(long = "log-json", help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

/// Replay strategy selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Batch settings, with defaults for anything not given
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}
