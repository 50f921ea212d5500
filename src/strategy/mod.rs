//! Processing strategy module for ledger aggregation
//!
//! This module defines the Strategy pattern for the read-and-aggregate half of
//! the settlement pipeline. Both strategies stream the same ledger file, apply
//! the same invalid-record policy and requester scope, and produce the same
//! [`LedgerSnapshot`]; they differ only in how the work is scheduled.

use crate::cli::StrategyType;
use crate::core::{GroupScope, InvalidRecordPolicy, LedgerSnapshot};
use crate::types::SettlementError;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for ledger aggregation
pub trait ProcessingStrategy: Send + Sync {
    /// Read expenses from `input_path` and aggregate those in `scope`
    ///
    /// Rejected records (parse failures, invalid amounts, empty participant
    /// sets, unsupported splits, overflow) are routed through `policy`.
    /// Records outside `scope` are ignored without validation of their
    /// balances.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (`FileNotFound`, `IoError`)
    /// - A record is rejected under the abort policy
    /// - A worker task fails (async strategy only)
    fn aggregate(
        &self,
        input_path: &Path,
        scope: &GroupScope,
        policy: InvalidRecordPolicy,
    ) -> Result<LedgerSnapshot, SettlementError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` means defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config.unwrap_or_default())),
    }
}
