//! Credit Ledger CLI
//!
//! Replays a CSV of ledger commands and prints every user's balance.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > balances.csv
//! cargo run -- --strategy sync commands.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 commands.csv
//! cargo run -- --journal ledger.journal --log-level debug commands.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, journal unreadable, output failure, etc.)

use credit_ledger::cli;
use credit_ledger::core::command_runner::CommandRunner;
use credit_ledger::core::JournalStore;
use credit_ledger::strategy;
use std::process;
use std::sync::Arc;

fn main() {
    let args = cli::parse_args();
    cli::init_logging(&args);

    let runner = match &args.journal {
        Some(path) => match JournalStore::open(path) {
            Ok(store) => CommandRunner::new(Arc::new(store)),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot open journal");
                process::exit(1);
            }
        },
        None => CommandRunner::in_memory(),
    };

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, runner)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!(error = %e, "replay failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
