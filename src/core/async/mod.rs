//! Asynchronous implementations of core components
//!
//! These components let the async strategy fold a ledger on a multi-threaded
//! tokio runtime:
//!
//! - **AsyncBalanceLedger**: Thread-safe merged balances using DashMap
//! - **BatchProcessor**: Per-group partitioning and concurrent folding
//!
//! Debt simplification itself stays synchronous and runs once on the merged
//! snapshot.

pub mod batch_processor;
pub mod ledger;

pub use batch_processor::BatchProcessor;
pub use ledger::AsyncBalanceLedger;
