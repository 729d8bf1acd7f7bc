//! Asynchronous batch replay strategy
//!
//! Reads commands in batches with [`AsyncReader`] on a tokio runtime and hands
//! each batch to a [`BatchProcessor`]. Batches run one after another, so a
//! user whose commands span batches still sees them in file order.

use crate::core::batch_processor::BatchProcessor;
use crate::core::command_runner::CommandRunner;
use crate::io::async_reader::AsyncReader;
use crate::strategy::{write_report, ProcessingStrategy};
use std::io::Write;
use std::path::Path;

/// Batch sizing for the async strategy
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Commands read per batch
    pub batch_size: usize,
    /// Upper bound on command groups running at once
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Zero values fall back to the defaults with a warning
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                default = default.batch_size,
                "invalid batch_size 0, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches 0, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

#[derive(Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    runner: CommandRunner,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig, runner: CommandRunner) -> Self {
        Self { config, runner }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        // Groups run on the blocking pool; its size bounds group concurrency
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .max_blocking_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let processor = BatchProcessor::new(self.runner.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut applied = 0usize;
            let mut failed = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for result in processor.process_batch(batch).await? {
                    if result.result.is_ok() {
                        applied += 1;
                    } else {
                        failed += 1;
                    }
                }
            }

            tracing::info!(applied, failed, "replay finished");
            Ok::<(), String>(())
        })?;

        write_report(&self.runner, output)
    }
}
