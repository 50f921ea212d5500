//! Batch processing with group-based partitioning
//!
//! This module provides the `BatchProcessor`, which folds a batch of expense
//! records by splitting it per group, aggregating each group's records on its
//! own tokio task, and merging the partial results into a shared
//! [`AsyncBalanceLedger`].
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── Arc<AsyncBalanceLedger>  (shared merged balances)
//!     └── InvalidRecordPolicy      (skip or abort on rejected records)
//! ```
//!
//! Balances are sums, so the order in which partitions are folded does not
//! change the result. Partitions are still merged in order of their first
//! expense: when a merge overflows, the partition is replayed one expense at a
//! time under the invalid-record policy, and which expense is rejected then
//! depends on what was merged before it.

use std::collections::HashMap;
use std::iter;
use std::sync::Arc;

use super::AsyncBalanceLedger;
use crate::core::aggregator::{aggregate, BalanceAggregator, InvalidRecordPolicy, LedgerSnapshot};
use crate::types::{ExpenseRecord, GroupId, SettlementError};

/// Batch processor with group-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Shared ledger every partition merges into
    ledger: Arc<AsyncBalanceLedger>,
    policy: InvalidRecordPolicy,
}

/// One group's folded records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupFold {
    pub partial: LedgerSnapshot,
    /// Records the fold accepted, in ledger order
    pub accepted: Vec<ExpenseRecord>,
}

impl BatchProcessor {
    pub fn new(ledger: Arc<AsyncBalanceLedger>, policy: InvalidRecordPolicy) -> Self {
        Self { ledger, policy }
    }

    /// Partition a batch of expenses by group
    ///
    /// Each record lands in exactly one partition and keeps its relative order.
    pub fn partition_by_group(
        &self,
        batch: Vec<ExpenseRecord>,
    ) -> HashMap<GroupId, Vec<ExpenseRecord>> {
        let mut group_batches: HashMap<GroupId, Vec<ExpenseRecord>> = HashMap::new();

        for record in batch {
            group_batches
                .entry(record.group.clone())
                .or_default()
                .push(record);
        }

        group_batches
    }

    /// Fold one group's records into a partial snapshot
    pub async fn process_group_expenses(
        &self,
        expenses: Vec<ExpenseRecord>,
    ) -> Result<GroupFold, SettlementError> {
        let mut aggregator = BalanceAggregator::new();
        let mut accepted = Vec::with_capacity(expenses.len());
        for record in expenses {
            if aggregator.apply_with_policy(&record, self.policy)? {
                accepted.push(record);
            }
        }
        Ok(GroupFold {
            partial: aggregator.finish(),
            accepted,
        })
    }

    /// Merge a folded partition into the shared ledger
    ///
    /// If the partition as a whole overflows the ledger, its accepted records
    /// are merged one by one and each overflow goes through the policy.
    pub fn merge_fold(&self, fold: GroupFold) -> Result<(), SettlementError> {
        let error = match self.ledger.merge(fold.partial) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_record_level() => e,
            Err(e) => return Err(e),
        };
        tracing::debug!(error = %error, "partition overflowed the ledger, merging per expense");

        for record in &fold.accepted {
            let single = aggregate(iter::once(record), InvalidRecordPolicy::Abort)?;
            if let Err(e) = self.ledger.merge(single) {
                self.policy.handle(e)?;
            }
        }
        Ok(())
    }

    /// Process a batch: one task per group, then merge every partial result
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a partition or a merge (only
    /// possible under the abort policy), or `TaskFailed` if a task panicked.
    /// Every task is awaited before returning.
    pub async fn process_batch(&self, batch: Vec<ExpenseRecord>) -> Result<(), SettlementError> {
        let mut partitions: Vec<Vec<ExpenseRecord>> =
            self.partition_by_group(batch).into_values().collect();
        partitions.sort_by_key(|expenses| expenses.first().map(|record| record.sequence));

        let mut tasks = Vec::with_capacity(partitions.len());
        for expenses in partitions {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_group_expenses(expenses).await
            }));
        }

        let mut first_error = None;
        for task in tasks {
            let outcome = match task.await {
                Ok(Ok(fold)) => self.merge_fold(fold),
                Ok(Err(e)) => Err(e),
                Err(e) => {
                    tracing::error!(error = %e, "partition task panicked");
                    Err(SettlementError::TaskFailed {
                        message: e.to_string(),
                    })
                }
            };
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
