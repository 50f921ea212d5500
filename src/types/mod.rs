//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `person`: Person and group identifiers
//! - `expense`: Expense records and the balance changes they imply
//! - `balance`: Net balance sheets
//! - `group`: Per-group totals and summaries
//! - `settlement`: Settlement output types
//! - `error`: Error types for the settlement engine

pub mod balance;
pub mod error;
pub mod expense;
pub mod group;
pub mod person;
pub mod settlement;

pub use balance::{BalanceEntry, BalanceSheet, FirstSeen, PersonBalance};
pub use error::SettlementError;
pub use expense::{BalanceDelta, ExpenseRecord, Sequence, SplitType};
pub use group::{GroupSummary, GroupTotal};
pub use person::{GroupId, Person, PersonId, UNKNOWN_PERSON_NAME};
pub use settlement::{round_money, ConsistencyWarning, Settlement, SettlementPlan};
