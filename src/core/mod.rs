//! Core business logic module
//!
//! This module contains the settlement pipeline components:
//! - `aggregator` - Folds expense records into net balances
//! - `simplifier` - Turns net balances into a short list of payments
//! - `directory` - Display-name lookup and requester scoping
//! - `async` - Concurrent ledger folding for the async strategy

pub mod aggregator;
pub mod r#async;
pub mod directory;
pub mod simplifier;

pub use aggregator::{aggregate, BalanceAggregator, InvalidRecordPolicy, LedgerSnapshot};
pub use directory::{Directory, GroupScope};
pub use r#async::{AsyncBalanceLedger, BatchProcessor};
pub use simplifier::{simplify, DebtSimplifier, SETTLEMENT_EPSILON};

use crate::types::{ExpenseRecord, SettlementError, SettlementPlan};

/// Settle a set of expenses in one call
///
/// Aggregates `records` into net balances and simplifies them into payments,
/// resolving names through `directory`. Rejected records are handled according
/// to `policy`.
///
/// # Examples
///
/// ```
/// use expense_settlement_engine::core::{settle, Directory, InvalidRecordPolicy};
/// use expense_settlement_engine::types::ExpenseRecord;
/// use rust_decimal::Decimal;
///
/// let records = vec![ExpenseRecord::new(0, "trip", Decimal::from(90), "a", ["a", "b", "c"])];
/// let plan = settle(&records, &Directory::new(), InvalidRecordPolicy::Skip).unwrap();
///
/// assert_eq!(plan.settlements.len(), 2);
/// assert_eq!(plan.settlements[0].from.id, "b");
/// assert_eq!(plan.settlements[0].amount, Decimal::from(30));
/// ```
pub fn settle(
    records: &[ExpenseRecord],
    directory: &Directory,
    policy: InvalidRecordPolicy,
) -> Result<SettlementPlan, SettlementError> {
    let snapshot = aggregate(records, policy)?;
    Ok(simplify(&snapshot.balances, directory))
}
