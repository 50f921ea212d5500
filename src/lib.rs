//! Expense Settlement Engine Library
//! # Overview
//!
//! This library turns a ledger of shared group expenses into net balances and
//! a short list of payments that settles them, with a sync and an async
//! aggregation strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (ExpenseRecord, BalanceSheet, Settlement, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::aggregator`] - Folds expenses into per-person net balances
//!   - [`core::simplifier`] - Greedy largest-pair debt simplification
//!   - [`core::directory`] - Display names and requester scoping
//! - [`io`] - Ledger and roster reading, report serialization
//! - [`strategy`] - Pluggable sync/async aggregation
//! - [`report`] - Settlements, balances and group reports in CSV or JSON
//! - [`pipeline`] - One settlement query end to end
//!
//! # Settlement Rules
//!
//! - Every expense is split equally: the payer is credited the full amount
//!   and each participant is debited `amount / participants`
//! - Balances smaller than 0.01 count as settled
//! - Payments are emitted largest debtor to largest creditor and rounded
//!   half away from zero to 2 decimal places
//! - Names come from the identity file, then the group roster, then "Unknown"

pub mod cli;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod strategy;
pub mod types;

pub use crate::core::{settle, BalanceAggregator, DebtSimplifier, Directory, InvalidRecordPolicy};
pub use pipeline::{run, SettlementRequest};
pub use report::{OutputFormat, Report, ReportKind};
pub use types::{
    BalanceSheet, ExpenseRecord, GroupId, Person, PersonId, Settlement, SettlementError,
    SettlementPlan,
};
