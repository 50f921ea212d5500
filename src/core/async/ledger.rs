//! Thread-safe balance ledger for async batch processing
//!
//! This module provides the `AsyncBalanceLedger`, which merges partial ledger
//! snapshots produced by concurrent workers into one set of balances.
//!
//! # Design
//!
//! Each worker folds its share of the expenses with a plain
//! [`BalanceAggregator`](crate::core::BalanceAggregator), so records stay
//! all-or-nothing. The resulting partial snapshots are merged here. A merge is
//! staged against the current values and committed only when every addition
//! fits, so a rejected partial leaves the ledger exactly as it was. Merges are
//! serialized; reads go straight to the `DashMap`s.
//!
//! Every entry carries the position where the person (or group) first appeared
//! and the merge keeps the earliest one, so the final ordering does not depend
//! on which worker finishes first.

use crate::core::aggregator::LedgerSnapshot;
use crate::types::{
    BalanceEntry, BalanceSheet, FirstSeen, GroupId, GroupTotal, PersonId, SettlementError,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Tally {
    balance: Decimal,
    first_seen: FirstSeen,
}

/// Concurrent balance ledger
///
/// Safe to share behind an `Arc` and merge into from many tasks at once.
#[derive(Debug, Default)]
pub struct AsyncBalanceLedger {
    balances: DashMap<PersonId, Tally>,
    groups: DashMap<GroupId, GroupTotal>,
    merge_lock: Mutex<()>,
}

impl AsyncBalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial snapshot into the ledger
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if a merged balance or group total cannot
    /// be represented. Nothing is merged in that case. Returns `TaskFailed` if
    /// a previous merge panicked while holding the merge lock.
    pub fn merge(&self, partial: LedgerSnapshot) -> Result<(), SettlementError> {
        let _guard = self.merge_lock.lock().map_err(|_| SettlementError::TaskFailed {
            message: "ledger merge lock poisoned".to_string(),
        })?;

        let mut staged_balances = Vec::with_capacity(partial.balances.len());
        for entry in partial.balances.iter() {
            let tally = match self.balances.get(&entry.person) {
                Some(existing) => Tally {
                    balance: existing
                        .balance
                        .checked_add(entry.balance)
                        .ok_or_else(|| {
                            SettlementError::arithmetic_overflow("balance", &entry.person)
                        })?,
                    first_seen: existing.first_seen.min(entry.first_seen),
                },
                None => Tally {
                    balance: entry.balance,
                    first_seen: entry.first_seen,
                },
            };
            staged_balances.push((entry.person.clone(), tally));
        }

        let mut staged_groups = Vec::with_capacity(partial.groups.len());
        for group in partial.groups {
            let merged = match self.groups.get(&group.group) {
                Some(existing) => GroupTotal {
                    total: existing
                        .total
                        .checked_add(group.total)
                        .ok_or_else(|| {
                            SettlementError::arithmetic_overflow("group total", &group.group)
                        })?,
                    expenses: existing.expenses + group.expenses,
                    first_seen: existing.first_seen.min(group.first_seen),
                    group: group.group.clone(),
                },
                None => group,
            };
            staged_groups.push(merged);
        }

        for (person, tally) in staged_balances {
            self.balances.insert(person, tally);
        }
        for group in staged_groups {
            self.groups.insert(group.group.clone(), group);
        }

        Ok(())
    }

    /// Number of persons with a balance entry
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Copy the current state out as an ordered snapshot
    pub fn snapshot(&self) -> LedgerSnapshot {
        let entries = self
            .balances
            .iter()
            .map(|entry| BalanceEntry {
                person: entry.key().clone(),
                balance: entry.value().balance,
                first_seen: entry.value().first_seen,
            })
            .collect();

        let mut groups: Vec<GroupTotal> = self
            .groups
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        groups.sort_by_key(|group| group.first_seen);

        LedgerSnapshot {
            balances: BalanceSheet::from_entries(entries),
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::{aggregate, InvalidRecordPolicy};
    use crate::types::ExpenseRecord;
    use std::sync::Arc;
    use std::thread;

    fn partial(records: &[ExpenseRecord]) -> LedgerSnapshot {
        aggregate(records, InvalidRecordPolicy::Skip).unwrap()
    }

    #[test]
    fn test_merge_matches_sequential_aggregation() {
        let records = vec![
            ExpenseRecord::new(0, "trip", Decimal::from(120), "a", ["a", "b", "c", "d"]),
            ExpenseRecord::new(1, "flat", Decimal::from(60), "b", ["c", "d"]),
            ExpenseRecord::new(2, "trip", Decimal::from(20), "c", ["a", "b"]),
        ];

        let ledger = AsyncBalanceLedger::new();
        ledger.merge(partial(&records[1..2])).unwrap();
        ledger.merge(partial(&[records[0].clone(), records[2].clone()])).unwrap();

        let merged = ledger.snapshot();
        let sequential = partial(&records);

        assert_eq!(merged.balances, sequential.balances);
        assert_eq!(merged.groups, sequential.groups);
    }

    #[test]
    fn test_merge_keeps_earliest_first_seen() {
        let ledger = AsyncBalanceLedger::new();
        ledger
            .merge(partial(&[ExpenseRecord::new(5, "g", Decimal::from(10), "b", ["a"])]))
            .unwrap();
        ledger
            .merge(partial(&[ExpenseRecord::new(1, "g", Decimal::from(10), "a", ["b"])]))
            .unwrap();

        let snapshot = ledger.snapshot();
        let order: Vec<&str> = snapshot.balances.iter().map(|e| e.person.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(snapshot.balances.get("a"), Decimal::ZERO);
        assert_eq!(snapshot.groups[0].first_seen, 1);
        assert_eq!(snapshot.groups[0].expenses, 2);
    }

    #[test]
    fn test_concurrent_merges() {
        let ledger = Arc::new(AsyncBalanceLedger::new());
        let mut handles = vec![];

        for i in 0..8u64 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                let group = format!("g{}", i);
                let record = ExpenseRecord::new(i, group, Decimal::from(10), "payer", ["x", "y"]);
                ledger.merge(partial(&[record])).unwrap();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = ledger.snapshot();
        assert_eq!(ledger.len(), 3);
        assert_eq!(snapshot.balances.get("payer"), Decimal::from(80));
        assert_eq!(snapshot.balances.get("x"), Decimal::from(-40));
        assert_eq!(snapshot.groups.len(), 8);
        assert_eq!(snapshot.balances.total(), Decimal::ZERO);
    }

    #[test]
    fn test_rejected_merge_leaves_ledger_untouched() {
        let ledger = AsyncBalanceLedger::new();
        ledger
            .merge(partial(&[ExpenseRecord::new(0, "g1", Decimal::MAX, "a", ["b"])]))
            .unwrap();
        let before = ledger.snapshot();

        // "c" and the new group come before the overflowing entry for "a"
        let result = ledger.merge(partial(&[
            ExpenseRecord::new(1, "g2", Decimal::from(5), "c", ["d"]),
            ExpenseRecord::new(2, "g2", Decimal::MAX, "a", ["b"]),
        ]));

        assert_eq!(result.unwrap_err(), SettlementError::arithmetic_overflow("balance", "a"));
        assert_eq!(ledger.snapshot(), before);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_empty_ledger_snapshot() {
        let ledger = AsyncBalanceLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.snapshot(), LedgerSnapshot::default());
    }
}
