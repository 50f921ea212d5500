//! I/O module
//!
//! Handles CSV parsing and report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, report serialization)
//! - `sync_reader` - Synchronous ledger reader with iterator interface
//! - `async_reader` - Asynchronous ledger reader with batch reading interface
//! - `roster` - Identity and group roster loading

pub mod async_reader;
pub mod csv_format;
pub mod roster;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_csv_record, write_balances_csv, write_group_summaries_csv, write_settlements_csv,
    CsvExpenseRecord, CsvMemberRecord, CsvPersonRecord,
};
pub use roster::load_directory;
pub use sync_reader::SyncReader;
