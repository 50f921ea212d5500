//! Expense Settlement Engine CLI
//!
//! Command-line interface for settling shared group expenses from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- expenses.csv > settlements.csv
//! cargo run -- --members members.csv --people people.csv expenses.csv
//! cargo run -- --members members.csv --user alice expenses.csv
//! cargo run -- --report balances --format json expenses.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 expenses.csv
//! ```
//!
//! The report goes to stdout; logs go to stderr and are filtered by
//! `RUST_LOG` (default `warn`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, missing roster for --user, rejected record under
//!   --on-invalid abort, etc.)

use expense_settlement_engine::{cli, pipeline, strategy};
use std::process;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let request = args.to_request();
    let mut output = std::io::stdout().lock();
    if let Err(e) = pipeline::run(&request, strategy.as_ref(), &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
