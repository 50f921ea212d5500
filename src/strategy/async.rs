//! Asynchronous batch processing strategy
//!
//! Multi-threaded aggregation on a tokio runtime, partitioned by group.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (group partitioning + one task per group)
//!         └── AsyncBalanceLedger (DashMap-backed merged balances)
//! ```
//!
//! Batches are read and processed one after another; within a batch every
//! group is folded on its own task. Because balances are plain sums and every
//! entry remembers where it first appeared, the merged snapshot is identical
//! to the one the sync strategy produces.

use crate::core::r#async::{AsyncBalanceLedger, BatchProcessor};
use crate::core::{GroupScope, InvalidRecordPolicy, LedgerSnapshot};
use crate::io::async_reader::AsyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::SettlementError;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of accepted expenses per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig, replacing zero values with defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                default = default.batch_size,
                "invalid batch_size 0, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches 0, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    async fn aggregate_async(
        &self,
        input_path: &Path,
        scope: &GroupScope,
        policy: InvalidRecordPolicy,
    ) -> Result<LedgerSnapshot, SettlementError> {
        let ledger = Arc::new(AsyncBalanceLedger::new());
        let processor = BatchProcessor::new(Arc::clone(&ledger), policy);

        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| SettlementError::open_failed(input_path, e))?;

        // csv-async reads futures::io, tokio files implement tokio::io
        let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
        let mut reader = AsyncReader::new(compat_file);

        let mut batches = 0usize;
        loop {
            let batch = reader.read_batch(self.config.batch_size, policy).await?;
            if batch.is_empty() {
                break;
            }

            let in_scope: Vec<_> = batch
                .into_iter()
                .filter(|record| {
                    let keep = scope.contains(&record.group);
                    if !keep {
                        tracing::debug!(
                            sequence = record.sequence,
                            group = %record.group,
                            "expense outside requester scope"
                        );
                    }
                    keep
                })
                .collect();

            processor.process_batch(in_scope).await?;
            batches += 1;
        }

        tracing::info!(batches, people = ledger.len(), "aggregated ledger");
        Ok(ledger.snapshot())
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn aggregate(
        &self,
        input_path: &Path,
        scope: &GroupScope,
        policy: InvalidRecordPolicy,
    ) -> Result<LedgerSnapshot, SettlementError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| SettlementError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(self.aggregate_async(input_path, scope, policy))
    }
}
