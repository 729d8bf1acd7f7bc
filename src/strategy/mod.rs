//! Replay strategy module
//!
//! A strategy is a complete replay pipeline: read ledger commands from a CSV
//! file, apply them through a [`CommandRunner`], and write the final balance
//! report. Implementations (synchronous, asynchronous batch) are selected at
//! runtime and must produce identical reports for the same input.

use crate::cli::StrategyType;
use crate::core::command_runner::CommandRunner;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Replay pipeline
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the commands in `input_path` and write the balance report
    ///
    /// Failing commands and malformed rows are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The runtime cannot be started
    /// - Balances cannot be read from the store
    /// - Output cannot be written
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a replay strategy applying commands through `runner`
///
/// `config` is ignored for the sync strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    runner: CommandRunner,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(runner)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            config.unwrap_or_default(),
            runner,
        )),
    }
}

/// Read final balances from `runner` and write the report
pub(crate) fn write_report(runner: &CommandRunner, output: &mut dyn Write) -> Result<(), String> {
    let balances = runner
        .balances()
        .map_err(|e| format!("Failed to read balances: {}", e))?;
    crate::io::write_balances_csv(&balances, output)
}
