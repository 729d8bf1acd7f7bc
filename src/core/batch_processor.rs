//! Batch processing with user-overlap partitioning
//!
//! This module provides the `BatchProcessor` struct, which applies a batch of
//! commands concurrently while keeping every outcome identical to applying the
//! batch in file order.
//!
//! # Design
//!
//! Commands are grouped so that any two commands touching a common user land
//! in the same group (a transfer joins its sender's and receiver's groups).
//! `open` commands all share one group, since name uniqueness spans users.
//! Groups are disjoint in the users they touch, so they run in parallel; each
//! group runs its commands sequentially in file order.
//!
//! ```text
//! BatchProcessor
//!     └── CommandRunner  (shared ledger + directory)
//! ```

use std::collections::HashMap;

use crate::core::command_runner::CommandRunner;
use crate::types::{LedgerCommand, LedgerError, UserId};

/// Result of applying a single command
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub command: LedgerCommand,
    pub result: Result<(), LedgerError>,
}

/// Disjoint-set forest over command indices
struct Groups {
    parent: Vec<usize>,
}

impl Groups {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            let grandparent = self.parent[self.parent[i]];
            self.parent[i] = grandparent;
            i = grandparent;
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            // Keep the earlier index as root so group order follows the file
            let (low, high) = if a < b { (a, b) } else { (b, a) };
            self.parent[high] = low;
        }
    }
}

/// Concurrent batch executor
#[derive(Clone)]
pub struct BatchProcessor {
    runner: CommandRunner,
}

impl BatchProcessor {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    /// Split a batch into groups of commands with overlapping users
    ///
    /// Groups are ordered by their first command; commands inside a group
    /// keep batch order.
    pub fn partition(batch: Vec<LedgerCommand>) -> Vec<Vec<LedgerCommand>> {
        let mut groups = Groups::new(batch.len());
        let mut first_touch: HashMap<UserId, usize> = HashMap::new();
        let mut first_open: Option<usize> = None;

        for (index, command) in batch.iter().enumerate() {
            if matches!(command, LedgerCommand::Open { .. }) {
                match first_open {
                    Some(first) => groups.union(first, index),
                    None => first_open = Some(index),
                }
            }
            for user in command.users() {
                match first_touch.get(&user) {
                    Some(&earlier) => groups.union(earlier, index),
                    None => {
                        first_touch.insert(user, index);
                    }
                }
            }
        }

        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut partitioned: Vec<Vec<LedgerCommand>> = Vec::new();
        for (index, command) in batch.into_iter().enumerate() {
            let root = groups.find(index);
            let slot = *slots.entry(root).or_insert_with(|| {
                partitioned.push(Vec::new());
                partitioned.len() - 1
            });
            partitioned[slot].push(command);
        }
        partitioned
    }

    /// Apply one group sequentially
    pub fn process_group(&self, commands: Vec<LedgerCommand>) -> Vec<ProcessingResult> {
        commands
            .into_iter()
            .map(|command| {
                let result = self.runner.apply(&command);
                if let Err(e) = &result {
                    tracing::warn!(command = command.kind(), error = %e, "command failed");
                }
                ProcessingResult { command, result }
            })
            .collect()
    }

    /// Apply a batch, running independent groups concurrently
    ///
    /// Ledger calls block on per-user sections and store I/O, so each group
    /// runs on tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if a group's task panicked. Command failures are not
    /// errors here; they are reported in each [`ProcessingResult`].
    pub async fn process_batch(
        &self,
        batch: Vec<LedgerCommand>,
    ) -> Result<Vec<ProcessingResult>, String> {
        let groups = Self::partition(batch);
        tracing::debug!(groups = groups.len(), "processing batch");

        let tasks: Vec<_> = groups
            .into_iter()
            .map(|group| {
                let processor = self.clone();
                tokio::task::spawn_blocking(move || processor.process_group(group))
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            let group_results = task.await.map_err(|e| {
                tracing::error!(error = %e, "command group task failed");
                format!("Command group task failed: {}", e)
            })?;
            results.extend(group_results);
        }
        Ok(results)
    }
}
