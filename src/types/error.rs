//! Error types for the expense settlement engine
//!
//! This module defines all error types that can occur while loading a ledger,
//! aggregating balances and writing reports.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, invalid data types, etc.
//! - **Expense Errors**: Empty participant sets, invalid amounts, unsupported splits
//! - **Arithmetic Errors**: Overflow in balance calculations

use crate::types::expense::Sequence;
use thiserror::Error;

/// Main error type for the settlement engine
///
/// Record-level variants (`InvalidExpense`, `InvalidAmount`,
/// `UnsupportedSplitType`, `ArithmeticOverflow`, `ParseError`) are recoverable:
/// the caller decides through [`crate::core::InvalidRecordPolicy`] whether the
/// record is skipped or the whole query aborts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error(
        "CSV parse error{}: {message}",
        line.map(|l| format!(" at line {}", l)).unwrap_or_default()
    )]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// An expense with no participants cannot be split
    #[error("Expense {sequence} in group '{group}' has no participants to split between")]
    InvalidExpense {
        /// Position of the expense in the ledger
        sequence: Sequence,
        /// Group that owns the expense
        group: String,
    },

    /// Amount is missing, malformed or negative
    #[error("Invalid amount '{amount}' for expense {sequence}")]
    InvalidAmount {
        /// The offending amount string
        amount: String,
        /// Position of the expense in the ledger
        sequence: Sequence,
    },

    /// Only equal splits are supported
    #[error("Unsupported split type '{split_type}' for expense {sequence}")]
    UnsupportedSplitType {
        /// The split type string as found in the ledger
        split_type: String,
        /// Position of the expense in the ledger
        sequence: Sequence,
    },

    /// Decimal arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for {subject}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Person or group whose running value overflowed
        subject: String,
    },

    /// Requester scoping was asked for without a group roster
    #[error("Cannot scope settlements to '{requester}' without a members roster")]
    MissingRoster {
        /// The requester identifier
        requester: String,
    },

    /// Report serialization failed
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the failure
        message: String,
    },

    /// A worker task failed before returning its partial ledger
    #[error("Worker task failed: {message}")]
    TaskFailed {
        /// Description of the failure
        message: String,
    },
}

impl From<std::io::Error> for SettlementError {
    fn from(error: std::io::Error) -> Self {
        SettlementError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for SettlementError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        SettlementError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for SettlementError {
    fn from(error: serde_json::Error) -> Self {
        SettlementError::SerializationError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl SettlementError {
    /// Map a failure to open `path` to FileNotFound or IoError
    pub fn open_failed(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            SettlementError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            SettlementError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            }
        }
    }

    /// Create an InvalidExpense error
    pub fn invalid_expense(sequence: Sequence, group: &str) -> Self {
        SettlementError::InvalidExpense {
            sequence,
            group: group.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, sequence: Sequence) -> Self {
        SettlementError::InvalidAmount {
            amount: amount.to_string(),
            sequence,
        }
    }

    /// Create an UnsupportedSplitType error
    pub fn unsupported_split_type(split_type: &str, sequence: Sequence) -> Self {
        SettlementError::UnsupportedSplitType {
            split_type: split_type.to_string(),
            sequence,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, subject: &str) -> Self {
        SettlementError::ArithmeticOverflow {
            operation: operation.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Create a MissingRoster error
    pub fn missing_roster(requester: &str) -> Self {
        SettlementError::MissingRoster {
            requester: requester.to_string(),
        }
    }

    /// Whether this error concerns a single ledger record rather than the whole query
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            SettlementError::ParseError { .. }
                | SettlementError::InvalidExpense { .. }
                | SettlementError::InvalidAmount { .. }
                | SettlementError::UnsupportedSplitType { .. }
                | SettlementError::ArithmeticOverflow { .. }
        )
    }
}
