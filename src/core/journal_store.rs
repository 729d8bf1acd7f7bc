//! Durable journal-backed transaction store
//!
//! Each committed unit of work is one JSON line in an append-only file:
//!
//! ```text
//! {"records":[{"id":1,"user":1,"amount":"-40","timestamp":"...","sender":1,"receiver":2}, ...]}
//! ```
//!
//! A line is written and synced before its records become visible to readers.
//! If the write fails, the file is truncated back to its previous length, so a
//! unit is never half on disk. On open the journal is replayed; a torn final
//! line left by a crash mid-write is discarded and cut from the file.

use crate::core::traits::{TransactionStore, UnitOfWork};
use crate::core::transaction_store::{check_record, stamp_unit, Log};
use crate::types::{LedgerError, NewTransaction, Transaction, UserId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One committed unit as stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    records: Vec<Transaction>,
}

/// Append target of the journal
trait JournalSink: Write + Send + fmt::Debug {
    fn sync(&mut self) -> io::Result<()>;

    /// Cut the sink back to `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl JournalSink for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

#[derive(Debug)]
struct JournalFile {
    sink: Box<dyn JournalSink>,
    len: u64,
}

/// Transaction store persisted to a JSON-lines journal
#[derive(Debug)]
pub struct JournalStore {
    path: PathBuf,
    /// Serializes writers; held across encode, write and sync
    writer: Mutex<JournalFile>,
    log: RwLock<Log>,
}

impl JournalStore {
    /// Open (or create) the journal at `path` and replay it
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the file cannot be opened, if a line
    /// other than the last one is unreadable or out of sequence, or if a
    /// replayed record breaks a record constraint.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let (log, valid_len) = replay(&bytes)?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        if valid_len < bytes.len() {
            tracing::warn!(
                path = %path.display(),
                discarded_bytes = bytes.len() - valid_len,
                "discarding torn journal tail"
            );
            file.set_len(valid_len as u64)?;
            file.sync_data()?;
        }

        tracing::info!(
            path = %path.display(),
            records = log.all().len(),
            "journal opened"
        );

        Ok(Self {
            path,
            writer: Mutex::new(JournalFile {
                sink: Box::new(file),
                len: valid_len as u64,
            }),
            log: RwLock::new(log),
        })
    }

    /// Location of the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Rebuild the log from journal bytes
///
/// Returns the log and the length of the valid prefix.
fn replay(bytes: &[u8]) -> Result<(Log, usize), LedgerError> {
    let mut log = Log::default();
    let mut offset = 0usize;
    let mut line_number = 0usize;

    while offset < bytes.len() {
        line_number += 1;
        let rest = &bytes[offset..];
        let Some(end) = rest.iter().position(|&b| b == b'\n') else {
            // No terminating newline: interrupted write
            break;
        };
        let is_last = offset + end + 1 == bytes.len();

        let entry = match serde_json::from_slice::<JournalEntry>(&rest[..end]) {
            Ok(entry) => entry,
            Err(_) if is_last => break,
            Err(e) => {
                return Err(LedgerError::storage(format!(
                    "corrupt journal at line {}: {}",
                    line_number, e
                )))
            }
        };

        let mut expected = log.next_id();
        for record in &entry.records {
            if record.id != expected {
                return Err(LedgerError::storage(format!(
                    "journal line {} has transaction {} where {} was expected",
                    line_number, record.id, expected
                )));
            }
            check_record(&NewTransaction::from(record)).map_err(|e| {
                LedgerError::storage(format!("journal line {}: {}", line_number, e))
            })?;
            expected += 1;
        }

        log.extend(&entry.records);
        offset += end + 1;
    }

    Ok((log, offset))
}

impl TransactionStore for JournalStore {
    fn commit(&self, unit: UnitOfWork) -> Result<Vec<Transaction>, LedgerError> {
        if unit.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.writer.lock();
        let journal = &mut *guard;
        let next_id = self.log.read().next_id();
        let committed = stamp_unit(unit, next_id)?;

        let mut line = serde_json::to_vec(&JournalEntry {
            records: committed.clone(),
        })?;
        line.push(b'\n');

        let previous_len = journal.len;
        let written = match journal.sink.write_all(&line) {
            Ok(()) => journal.sink.sync(),
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            tracing::error!(error = %e, path = %self.path.display(), "journal write failed, rolling back");
            if let Err(truncate_error) = journal.sink.truncate(previous_len) {
                tracing::error!(error = %truncate_error, "journal rollback truncate failed");
            }
            return Err(e.into());
        }

        journal.len = previous_len + line.len() as u64;
        self.log.write().extend(&committed);

        tracing::debug!(
            first_id = next_id,
            records = committed.len(),
            "journaled unit"
        );
        Ok(committed)
    }

    fn list_for_user(&self, user: UserId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.log.read().for_user(user))
    }

    fn list_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.log.read().all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransferLink;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn at(second: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, second).unwrap()
    }

    fn transfer_unit(sender: UserId, receiver: UserId, amount: i64) -> UnitOfWork {
        NewTransaction::transfer_legs(TransferLink { sender, receiver }, Decimal::from(amount), at(5))
            .into_iter()
            .collect()
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.journal");

        {
            let store = JournalStore::open(&path).unwrap();
            store
                .append(NewTransaction::credit(1, Decimal::from(100), at(0)))
                .unwrap();
            store.commit(transfer_unit(1, 2, 40)).unwrap();
        }

        let reopened = JournalStore::open(&path).unwrap();
        let all = reopened.list_all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(reopened.list_for_user(2).unwrap()[0].amount, Decimal::from(40));

        // Ids continue after the replayed ones
        let next = reopened
            .append(NewTransaction::credit(2, Decimal::ONE, at(9)))
            .unwrap();
        assert_eq!(next.id, 4);
    }

    #[test]
    fn test_torn_tail_is_discarded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.journal");

        {
            let store = JournalStore::open(&path).unwrap();
            store
                .append(NewTransaction::credit(1, Decimal::from(100), at(0)))
                .unwrap();
        }
        let intact_len = fs::metadata(&path).unwrap().len();

        // Simulate a crash halfway through writing a transfer unit
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"records":[{"id":2,"user":1,"amount":"-40""#)
            .unwrap();
        drop(file);

        let reopened = JournalStore::open(&path).unwrap();
        assert_eq!(reopened.list_all().unwrap().len(), 1);
        assert_eq!(fs::metadata(&path).unwrap().len(), intact_len);
    }

    #[test]
    fn test_corrupt_middle_line_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.journal");

        {
            let store = JournalStore::open(&path).unwrap();
            store
                .append(NewTransaction::credit(1, Decimal::from(100), at(0)))
                .unwrap();
        }
        let mut contents = b"not json\n".to_vec();
        contents.extend(fs::read(&path).unwrap());
        fs::write(&path, contents).unwrap();

        let result = JournalStore::open(&path);
        assert!(matches!(result, Err(LedgerError::Storage { .. })));
    }

    #[test]
    fn test_rejected_unit_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.journal");
        let store = JournalStore::open(&path).unwrap();
        store
            .append(NewTransaction::credit(1, Decimal::from(10), at(0)))
            .unwrap();
        let len_before = fs::metadata(&path).unwrap().len();

        let mut unit = UnitOfWork::new();
        unit.push(NewTransaction::debit(1, Decimal::from(5), at(1)));
        unit.push(NewTransaction::credit(2, Decimal::ZERO, at(1)));
        assert!(store.commit(unit).is_err());

        assert_eq!(fs::metadata(&path).unwrap().len(), len_before);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    /// Writes the first half of each buffer, then fails
    #[derive(Debug)]
    struct TornWriter {
        file: File,
    }

    impl Write for TornWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.file.write_all(&buf[..buf.len() / 2])?;
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    impl JournalSink for TornWriter {
        fn sync(&mut self) -> io::Result<()> {
            self.file.sync_data()
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            self.file.set_len(len)
        }
    }

    #[test]
    fn test_failed_write_is_truncated_away() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.journal");
        let store = JournalStore::open(&path).unwrap();
        store
            .append(NewTransaction::credit(1, Decimal::from(100), at(0)))
            .unwrap();
        let len_before = fs::metadata(&path).unwrap().len();

        let torn = TornWriter {
            file: OpenOptions::new().append(true).open(&path).unwrap(),
        };
        let original = std::mem::replace(&mut store.writer.lock().sink, Box::new(torn));

        let result = store.commit(transfer_unit(1, 2, 40));

        assert_eq!(
            result,
            Err(LedgerError::Storage {
                message: "disk full".to_string()
            })
        );
        assert_eq!(fs::metadata(&path).unwrap().len(), len_before);
        assert_eq!(store.list_all().unwrap().len(), 1);

        // Later units reuse the ids of the rolled-back one
        store.writer.lock().sink = original;
        store.commit(transfer_unit(1, 2, 40)).unwrap();
        drop(store);

        let reopened = JournalStore::open(&path).unwrap();
        let ids: Vec<_> = reopened.list_all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[rstest]
    #[case::zero_amount(r#"{"records":[{"id":1,"user":1,"amount":"0","timestamp":"2024-02-01T09:00:00Z","sender":null,"receiver":null}]}"#)]
    #[case::one_sided_link(r#"{"records":[{"id":1,"user":1,"amount":"5","timestamp":"2024-02-01T09:00:00Z","sender":2,"receiver":null}]}"#)]
    #[case::unrelated_owner(r#"{"records":[{"id":1,"user":3,"amount":"5","timestamp":"2024-02-01T09:00:00Z","sender":1,"receiver":2}]}"#)]
    fn test_replay_rejects_constraint_violations(#[case] line: &str) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.journal");
        fs::write(&path, format!("{}\n", line)).unwrap();

        let result = JournalStore::open(&path);

        assert!(matches!(
            result,
            Err(LedgerError::Storage { message }) if message.starts_with("journal line 1:")
        ));
    }

    #[test]
    fn test_open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.journal");

        let store = JournalStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
        assert!(store.list_all().unwrap().is_empty());
    }
}
