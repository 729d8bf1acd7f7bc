//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Applies every command through a fresh in-memory ledger
//! 3. Generates the balance report
//! 4. Compares the report with expected.csv
//!
//! Fixtures live in tests/fixtures/ and cover:
//! - Happy path grants and withdrawals
//! - Transfer chains
//! - Rejected debits (insufficient balance)
//! - Unknown users, duplicate registrations, invalid amounts
//! - Four-decimal precision and large values
//! - Malformed rows
//!
//! Each fixture runs under both the sync and the async strategy.

#[cfg(test)]
mod tests {
    use credit_ledger::cli::StrategyType;
    use credit_ledger::core::command_runner::CommandRunner;
    use credit_ledger::core::JournalStore;
    use credit_ledger::strategy::create_strategy;
    use credit_ledger::TransactionStore;
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::{NamedTempFile, TempDir};

    /// Replay `input_path` and return the report
    fn replay(input_path: &Path, strategy_type: StrategyType, runner: CommandRunner) -> String {
        let strategy = create_strategy(strategy_type, None, runner);
        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(input_path, &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to replay commands: {}", e));
        temp_output.flush().expect("Failed to flush temp file");

        fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e))
    }

    /// Run a fixture and compare with its expected.csv
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let actual_output = replay(
            Path::new(&input_path),
            strategy_type,
            CommandRunner::in_memory(),
        );
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    #[rstest]
    #[case("happy_path")]
    #[case("transfers")]
    #[case("insufficient_balance")]
    #[case("unknown_users")]
    #[case("invalid_requests")]
    #[case("precision")]
    #[case("malformed_data")]
    #[case("empty")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }

    #[rstest]
    fn test_journal_backed_replay_persists_transactions(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let dir = TempDir::new().unwrap();
        let journal = dir.path().join("ledger.journal");
        let input = Path::new("tests/fixtures/transfers/input.csv");

        let store = JournalStore::open(&journal).unwrap();
        let report = replay(input, strategy, CommandRunner::new(Arc::new(store)));
        assert_eq!(
            report,
            fs::read_to_string("tests/fixtures/transfers/expected.csv").unwrap()
        );

        // grant + three transfers (two legs each) + withdraw
        let reopened = JournalStore::open(&journal).unwrap();
        assert_eq!(reopened.list_all().unwrap().len(), 8);
    }
}
