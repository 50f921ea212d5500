//! Asynchronous CSV reader with batch interface
//!
//! Reads expense records from any `futures::io::AsyncRead` source in batches
//! for the async strategy.
//!
//! # Architecture
//!
//! ```text
//! AsyncRead → csv-async deserializer → AsyncReader → Vec<ExpenseRecord> batches
//!                                          ↓
//!                                  csv_format module
//!                       (CsvExpenseRecord, convert_csv_record)
//! ```
//!
//! Sequence numbers are assigned the same way as in the sync reader (one per
//! data row, rejected rows included) so both strategies order people and
//! groups identically.

use crate::core::InvalidRecordPolicy;
use crate::io::csv_format::{convert_csv_record, CsvExpenseRecord};
use crate::types::{ExpenseRecord, Sequence, SettlementError};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous ledger reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    next_sequence: Sequence,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            next_sequence: 0,
        }
    }

    /// Read up to `batch_size` accepted expense records
    ///
    /// Rows that fail to parse or convert are routed through `policy`: skipped
    /// rows do not count toward the batch size. An empty batch means the end
    /// of the input was reached.
    ///
    /// # Errors
    ///
    /// Returns the first rejected row's error under the abort policy.
    pub async fn read_batch(
        &mut self,
        batch_size: usize,
        policy: InvalidRecordPolicy,
    ) -> Result<Vec<ExpenseRecord>, SettlementError> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<CsvExpenseRecord>();

        while batch.len() < batch_size {
            let Some(row) = rows.next().await else {
                break;
            };

            let sequence = self.next_sequence;
            self.next_sequence += 1;

            let converted = match row {
                Ok(csv_record) => convert_csv_record(csv_record, sequence),
                Err(e) => Err(SettlementError::ParseError {
                    line: e.position().map(|pos| pos.line()),
                    message: e.to_string(),
                }),
            };

            match converted {
                Ok(record) => batch.push(record),
                Err(e) => policy.handle(e)?,
            }
        }

        Ok(batch)
    }
}
