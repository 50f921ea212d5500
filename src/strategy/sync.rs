//! Synchronous processing strategy
//!
//! Single-threaded aggregation: records stream out of the [`SyncReader`] one
//! at a time and are folded into a [`BalanceAggregator`]. Memory use is
//! O(persons + groups), not O(expenses).

use crate::core::{BalanceAggregator, GroupScope, InvalidRecordPolicy, LedgerSnapshot};
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::SettlementError;
use std::path::Path;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use expense_settlement_engine::core::{GroupScope, InvalidRecordPolicy};
/// use expense_settlement_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
///
/// let snapshot = SyncProcessingStrategy
///     .aggregate(Path::new("expenses.csv"), &GroupScope::All, InvalidRecordPolicy::Skip)
///     .expect("aggregation failed");
/// println!("{} people with a balance", snapshot.balances.len());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn aggregate(
        &self,
        input_path: &Path,
        scope: &GroupScope,
        policy: InvalidRecordPolicy,
    ) -> Result<LedgerSnapshot, SettlementError> {
        let reader = SyncReader::new(input_path)?;
        let mut aggregator = BalanceAggregator::new();
        let mut applied = 0usize;

        for result in reader {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    policy.handle(e)?;
                    continue;
                }
            };

            if !scope.contains(&record.group) {
                tracing::debug!(
                    sequence = record.sequence,
                    group = %record.group,
                    "expense outside requester scope"
                );
                continue;
            }

            if aggregator.apply_with_policy(&record, policy)? {
                applied += 1;
            }
        }

        tracing::info!(applied, "aggregated ledger");
        Ok(aggregator.finish())
    }
}
