//! Balance aggregation
//!
//! This module provides the `BalanceAggregator`, which folds expense records
//! into a net balance per person and a running total per group.
//!
//! For every record with amount `a` split between `n` participants, the payer
//! is credited `a` and every participant (the payer included, when listed) is
//! debited `a / n`. Each record is applied all-or-nothing: a record that fails
//! validation or would overflow leaves the aggregator untouched.

use crate::types::{
    BalanceEntry, BalanceSheet, ExpenseRecord, FirstSeen, GroupId, GroupTotal, PersonId,
    SettlementError,
};
use clap::ValueEnum;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// What to do with a record the engine rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InvalidRecordPolicy {
    /// Log the record and keep going
    #[default]
    Skip,
    /// Fail the whole query
    Abort,
}

impl InvalidRecordPolicy {
    /// Apply the policy to a rejected record
    ///
    /// Returns `Ok(())` when the record should be skipped, or the error back
    /// when the query should abort. Errors that are not about a single record
    /// (I/O, missing roster, failed tasks) are returned under either policy.
    pub fn handle(self, error: SettlementError) -> Result<(), SettlementError> {
        match self {
            _ if !error.is_record_level() => Err(error),
            InvalidRecordPolicy::Skip => {
                tracing::warn!(error = %error, "skipping rejected expense record");
                Ok(())
            }
            InvalidRecordPolicy::Abort => Err(error),
        }
    }
}

/// Everything aggregated from a ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    pub balances: BalanceSheet,
    /// Group totals, ordered by each group's first accepted expense
    pub groups: Vec<GroupTotal>,
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    balance: Decimal,
    first_seen: FirstSeen,
}

/// Folds expense records into net balances
#[derive(Debug, Default)]
pub struct BalanceAggregator {
    balances: HashMap<PersonId, Tally>,
    groups: HashMap<GroupId, GroupTotal>,
}

impl BalanceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single expense record
    ///
    /// # Errors
    ///
    /// - `InvalidExpense` if the record has no participants
    /// - `ArithmeticOverflow` if a balance or group total cannot be represented
    pub fn apply(&mut self, record: &ExpenseRecord) -> Result<(), SettlementError> {
        let deltas = record.deltas()?;

        // Stage every update first so a failing record changes nothing
        let mut staged = Vec::with_capacity(deltas.len());
        for delta in &deltas {
            let tally = match self.balances.get(delta.person) {
                Some(existing) => Tally {
                    balance: existing
                        .balance
                        .checked_add(delta.amount)
                        .ok_or_else(|| {
                            SettlementError::arithmetic_overflow("balance", delta.person)
                        })?,
                    first_seen: existing.first_seen,
                },
                None => Tally {
                    balance: delta.amount,
                    first_seen: delta.first_seen,
                },
            };
            staged.push((delta.person, tally));
        }

        let group_total = match self.groups.get(&record.group) {
            Some(existing) => existing.clone(),
            None => GroupTotal::new(record.group.clone(), record.sequence),
        };
        let total = group_total
            .total
            .checked_add(record.amount)
            .ok_or_else(|| SettlementError::arithmetic_overflow("group total", &record.group))?;

        for (person, tally) in staged {
            self.balances.insert(person.clone(), tally);
        }
        self.groups.insert(
            record.group.clone(),
            GroupTotal {
                expenses: group_total.expenses + 1,
                total,
                ..group_total
            },
        );

        Ok(())
    }

    /// Apply a record, routing a rejection through `policy`
    ///
    /// Returns `Ok(true)` if the record was applied and `Ok(false)` if it was
    /// skipped.
    pub fn apply_with_policy(
        &mut self,
        record: &ExpenseRecord,
        policy: InvalidRecordPolicy,
    ) -> Result<bool, SettlementError> {
        match self.apply(record) {
            Ok(()) => Ok(true),
            Err(error) => policy.handle(error).map(|()| false),
        }
    }

    /// Finish aggregation
    pub fn finish(self) -> LedgerSnapshot {
        let entries = self
            .balances
            .into_iter()
            .map(|(person, tally)| BalanceEntry {
                person,
                balance: tally.balance,
                first_seen: tally.first_seen,
            })
            .collect();

        let mut groups: Vec<GroupTotal> = self.groups.into_values().collect();
        groups.sort_by_key(|group| group.first_seen);

        LedgerSnapshot {
            balances: BalanceSheet::from_entries(entries),
            groups,
        }
    }
}

/// Aggregate a batch of records in one go
pub fn aggregate<'a, I>(
    records: I,
    policy: InvalidRecordPolicy,
) -> Result<LedgerSnapshot, SettlementError>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut aggregator = BalanceAggregator::new();
    for record in records {
        aggregator.apply_with_policy(record, policy)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn expense(sequence: u64, amount: i64, payer: &str, participants: &[&str]) -> ExpenseRecord {
        ExpenseRecord::new(
            sequence,
            "trip",
            Decimal::from(amount),
            payer,
            participants.iter().copied(),
        )
    }

    fn many_small_expenses() -> Vec<ExpenseRecord> {
        let payers = ["a", "b", "c"];
        let people = ["a", "b", "c", "d"];
        (0..50u64)
            .map(|i| {
                let participants = &people[..1 + (i % 4) as usize];
                expense(i, 7 + i as i64, payers[(i % 3) as usize], participants)
            })
            .collect()
    }

    #[rstest]
    #[case::skip_bad_amount(
        InvalidRecordPolicy::Skip,
        SettlementError::invalid_amount("x", 3),
        true
    )]
    #[case::skip_overflow(
        InvalidRecordPolicy::Skip,
        SettlementError::arithmetic_overflow("balance", "a"),
        true
    )]
    #[case::skip_missing_roster(
        InvalidRecordPolicy::Skip,
        SettlementError::missing_roster("alice"),
        false
    )]
    #[case::skip_io_error(
        InvalidRecordPolicy::Skip,
        SettlementError::IoError { message: "disk".to_string() },
        false
    )]
    #[case::abort_bad_amount(
        InvalidRecordPolicy::Abort,
        SettlementError::invalid_amount("x", 3),
        false
    )]
    fn test_policy_only_skips_record_errors(
        #[case] policy: InvalidRecordPolicy,
        #[case] error: SettlementError,
        #[case] skipped: bool,
    ) {
        let outcome = policy.handle(error.clone());
        if skipped {
            assert_eq!(outcome, Ok(()));
        } else {
            assert_eq!(outcome, Err(error));
        }
    }

    #[test]
    fn test_single_expense_split_three_ways() {
        let records = vec![expense(0, 90, "a", &["a", "b", "c"])];
        let snapshot = aggregate(&records, InvalidRecordPolicy::Skip).unwrap();

        assert_eq!(snapshot.balances.get("a"), Decimal::from(60));
        assert_eq!(snapshot.balances.get("b"), Decimal::from(-30));
        assert_eq!(snapshot.balances.get("c"), Decimal::from(-30));
    }

    #[test]
    fn test_two_expenses_net_out() {
        let records = vec![
            expense(0, 100, "a", &["a", "b"]),
            expense(1, 40, "b", &["a", "b"]),
        ];
        let snapshot = aggregate(&records, InvalidRecordPolicy::Skip).unwrap();

        assert_eq!(snapshot.balances.get("a"), Decimal::from(30));
        assert_eq!(snapshot.balances.get("b"), Decimal::from(-30));
    }

    #[test]
    fn test_empty_ledger() {
        let snapshot = aggregate(&Vec::new(), InvalidRecordPolicy::Skip).unwrap();
        assert!(snapshot.balances.is_empty());
        assert!(snapshot.groups.is_empty());
    }

    #[rstest]
    #[case::three_way_uneven(vec![expense(0, 100, "a", &["a", "b", "c"])])]
    #[case::payer_not_included(vec![expense(0, 10, "a", &["b", "c", "d"])])]
    #[case::many_small(many_small_expenses())]
    #[case::mixed(vec![
        expense(0, 120, "a", &["a", "b", "c", "d"]),
        expense(1, 60, "b", &["c", "d"]),
        expense(2, 20, "c", &["a", "b"]),
        expense(3, 1, "d", &["a", "b", "c"]),
    ])]
    fn test_balances_sum_to_zero(#[case] records: Vec<ExpenseRecord>) {
        let snapshot = aggregate(&records, InvalidRecordPolicy::Skip).unwrap();
        assert!(snapshot.balances.total().abs() < Decimal::new(1, 9));
    }

    #[test]
    fn test_first_appearance_order() {
        let records = vec![
            expense(0, 30, "c", &["b", "c"]),
            expense(1, 30, "a", &["d", "b"]),
        ];
        let snapshot = aggregate(&records, InvalidRecordPolicy::Skip).unwrap();

        let order: Vec<&str> = snapshot.balances.iter().map(|e| e.person.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_invalid_record_is_skipped_without_side_effects() {
        let records = vec![
            expense(0, 90, "a", &["a", "b", "c"]),
            expense(1, 50, "b", &[]),
        ];
        let snapshot = aggregate(&records, InvalidRecordPolicy::Skip).unwrap();

        assert_eq!(snapshot.balances.get("b"), Decimal::from(-30));
        assert_eq!(snapshot.groups.len(), 1);
        assert_eq!(snapshot.groups[0].expenses, 1);
        assert_eq!(snapshot.groups[0].total, Decimal::from(90));
    }

    #[test]
    fn test_invalid_record_aborts_under_abort_policy() {
        let records = vec![expense(0, 90, "a", &["a"]), expense(1, 50, "b", &[])];
        let result = aggregate(&records, InvalidRecordPolicy::Abort);
        assert_eq!(result.unwrap_err(), SettlementError::invalid_expense(1, "trip"));
    }

    #[test]
    fn test_overflow_leaves_aggregator_untouched() {
        let mut aggregator = BalanceAggregator::new();
        aggregator.apply(&expense(0, 10, "a", &["b"])).unwrap();

        let huge = ExpenseRecord::new(1, "trip", Decimal::MAX, "a", ["b"]);
        let result = aggregator.apply(&huge);
        assert!(matches!(result, Err(SettlementError::ArithmeticOverflow { .. })));

        let snapshot = aggregator.finish();
        assert_eq!(snapshot.balances.get("a"), Decimal::from(10));
        assert_eq!(snapshot.balances.get("b"), Decimal::from(-10));
        assert_eq!(snapshot.groups[0].expenses, 1);
    }

    #[test]
    fn test_group_totals_in_first_seen_order() {
        let records = vec![
            ExpenseRecord::new(0, "flat", Decimal::from(80), "a", ["a", "b"]),
            ExpenseRecord::new(1, "trip", Decimal::from(30), "b", ["a", "b", "c"]),
            ExpenseRecord::new(2, "flat", Decimal::from(20), "b", ["a"]),
        ];
        let snapshot = aggregate(&records, InvalidRecordPolicy::Skip).unwrap();

        assert_eq!(snapshot.groups.len(), 2);
        assert_eq!(snapshot.groups[0].group, "flat");
        assert_eq!(snapshot.groups[0].expenses, 2);
        assert_eq!(snapshot.groups[0].total, Decimal::from(100));
        assert_eq!(snapshot.groups[1].group, "trip");
        assert_eq!(snapshot.groups[1].total, Decimal::from(30));
    }
}
