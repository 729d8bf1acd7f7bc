//! Asynchronous CSV reader with batch interface
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of LedgerCommands
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```
//!
//! Built on csv-async; the caller supplies any `futures::io::AsyncRead`, for
//! example a tokio file behind the tokio-util compat layer.

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::LedgerCommand;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
///
/// Rows that fail to parse or convert are logged and skipped.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 0,
        }
    }

    /// Read up to `batch_size` commands
    ///
    /// Returns an empty vector at end of input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<LedgerCommand> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(row) = records.next().await else {
                break;
            };
            self.line_num += 1;
            let line = self.line_num + 1;

            match row {
                Ok(csv_record) => match convert_csv_record(csv_record) {
                    Ok(command) => batch.push(command),
                    Err(e) => tracing::warn!(line, error = %e, "skipping invalid command"),
                },
                Err(e) => tracing::warn!(line, error = %e, "skipping unparsable row"),
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    fn reader(rows: &str) -> AsyncReader<Cursor<Vec<u8>>> {
        let content = format!("type,user,counterparty,amount,name\n{}", rows);
        AsyncReader::new(Cursor::new(content.into_bytes()))
    }

    #[tokio::test]
    async fn test_async_reader_multiple_batches() {
        let mut async_reader = reader(
            "grant,1,,1,\n\
             grant,1,,2,\n\
             grant,1,,3,\n\
             grant,1,,4,\n\
             grant,1,,5,\n",
        );

        let amounts = |batch: Vec<LedgerCommand>| -> Vec<Decimal> {
            batch
                .into_iter()
                .map(|command| match command {
                    LedgerCommand::Grant { amount, .. } => amount,
                    other => panic!("unexpected command {:?}", other),
                })
                .collect()
        };

        assert_eq!(
            amounts(async_reader.read_batch(2).await),
            vec![Decimal::from(1), Decimal::from(2)]
        );
        assert_eq!(
            amounts(async_reader.read_batch(2).await),
            vec![Decimal::from(3), Decimal::from(4)]
        );
        assert_eq!(amounts(async_reader.read_batch(2).await), vec![Decimal::from(5)]);
        assert!(async_reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let mut async_reader = reader("");
        assert!(async_reader.read_batch(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_rows() {
        let mut async_reader = reader(
            "deposit,1,,100.0,\n\
             grant,x,,1,\n\
             transfer,1,2,50.0,\n",
        );

        let batch = async_reader.read_batch(10).await;

        assert_eq!(
            batch,
            vec![LedgerCommand::Transfer {
                sender: 1,
                receiver: 2,
                amount: Decimal::from(50)
            }]
        );
    }

    #[tokio::test]
    async fn test_async_reader_open_and_whitespace() {
        let mut async_reader = reader("  OPEN  ,  7  ,  ,  ,  zed  \n");

        let batch = async_reader.read_batch(10).await;

        assert_eq!(
            batch,
            vec![LedgerCommand::Open {
                user: 7,
                name: "zed".to_string()
            }]
        );
    }
}
