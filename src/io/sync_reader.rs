//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over expense records from a ledger file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader deserializes one row at a time with `csv::Reader`, so memory
//! use stays constant regardless of ledger size. Every data row, valid or not,
//! consumes one sequence number; that number is the record's position in the
//! ledger and drives first-appearance ordering downstream.
//!
//! ```no_run
//! use expense_settlement_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("expenses.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("expense {} in {}", record.sequence, record.group),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Opening the file fails fast from `new()`
//! - Row-level parse and conversion errors are yielded as `Err` items, so the
//!   caller can apply its invalid-record policy and keep iterating

use crate::io::csv_format::{convert_csv_record, CsvExpenseRecord};
use crate::types::{ExpenseRecord, Sequence, SettlementError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous ledger reader
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    next_sequence: Sequence,
}

impl SyncReader {
    /// Open a ledger file for streaming iteration
    ///
    /// The CSV reader trims whitespace from all fields and allows rows without
    /// the optional trailing columns.
    ///
    /// # Errors
    ///
    /// `FileNotFound` if the path does not exist, `IoError` for any other
    /// failure to open it.
    pub fn new(path: &Path) -> Result<Self, SettlementError> {
        let file = File::open(path).map_err(|e| SettlementError::open_failed(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            next_sequence: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<ExpenseRecord, SettlementError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.reader.deserialize::<CsvExpenseRecord>().next()?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        Some(match row {
            Ok(csv_record) => convert_csv_record(csv_record, sequence),
            Err(e) => Err(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "group,payer,amount,participants,description,split_type\n";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert_eq!(
            result.unwrap_err(),
            SettlementError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
    }

    #[test]
    fn test_sync_reader_reads_expense() {
        let file = create_temp_csv(&format!("{HEADER}trip,a,90.00,a;b;c,dinner,equal\n"));

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        assert_eq!(records.len(), 1);

        let record = records[0].as_ref().unwrap();
        assert_eq!(record.sequence, 0);
        assert_eq!(record.group, "trip");
        assert_eq!(record.payer, "a");
        assert_eq!(record.amount, Decimal::new(9000, 2));
        assert_eq!(record.participants, vec!["a", "b", "c"]);
        assert_eq!(record.description.as_deref(), Some("dinner"));
    }

    #[test]
    fn test_sync_reader_accepts_short_rows() {
        let file = create_temp_csv("group,payer,amount,participants\ntrip,a,10,a;b\n");

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, None);
    }

    #[test]
    fn test_sync_reader_sequence_counts_rejected_rows() {
        let file = create_temp_csv(&format!(
            "{HEADER}trip,a,10,a;b,,\ntrip,b,oops,a;b,,\ntrip,c,30,a;c,,\n"
        ));

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].as_ref().unwrap().sequence, 0);
        assert_eq!(
            records[1].as_ref().unwrap_err(),
            &SettlementError::invalid_amount("oops", 1)
        );
        assert_eq!(records[2].as_ref().unwrap().sequence, 2);
    }

    #[test]
    fn test_sync_reader_reports_line_of_malformed_row() {
        let file = create_temp_csv(&format!("{HEADER}trip,a,10,a;b,,\ntrip\n"));

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        assert_eq!(records.len(), 2);
        match records[1].as_ref().unwrap_err() {
            SettlementError::ParseError { line, .. } => assert_eq!(*line, Some(3)),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let file = create_temp_csv(&format!("{HEADER}  trip  ,  a  ,  12.5  , a ; b ,,\n"));

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.payer, "a");
        assert_eq!(record.amount, Decimal::new(125, 1));
        assert_eq!(record.participants, vec!["a", "b"]);
    }

    #[test]
    fn test_sync_reader_handles_empty_file_after_header() {
        let file = create_temp_csv(HEADER);
        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
