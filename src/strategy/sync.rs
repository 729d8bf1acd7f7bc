//! Synchronous replay strategy
//!
//! Streams commands with [`SyncReader`] and applies each one before reading
//! the next, on the calling thread.

use crate::core::command_runner::CommandRunner;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{write_report, ProcessingStrategy};
use std::io::Write;
use std::path::Path;

#[derive(Clone)]
pub struct SyncProcessingStrategy {
    runner: CommandRunner,
}

impl SyncProcessingStrategy {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;
        let mut applied = 0usize;
        let mut failed = 0usize;

        for result in reader {
            match result {
                Ok(command) => match self.runner.apply(&command) {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        failed += 1;
                        tracing::warn!(command = command.kind(), error = %e, "command failed");
                    }
                },
                Err(e) => {
                    failed += 1;
                    tracing::warn!(error = %e, "skipping row");
                }
            }
        }

        tracing::info!(applied, failed, "replay finished");
        write_report(&self.runner, output)
    }
}
