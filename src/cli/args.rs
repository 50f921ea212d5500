use crate::core::InvalidRecordPolicy;
use crate::pipeline::SettlementRequest;
use crate::report::{OutputFormat, ReportKind};
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Settle shared expenses into a minimal list of payments
#[derive(Parser, Debug)]
#[command(name = "settle")]
#[command(about = "Settle shared group expenses into a short list of payments", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing expense records
    #[arg(value_name = "INPUT", help = "Path to the expenses CSV file")]
    pub input_file: PathBuf,

    /// Group roster file
    #[arg(
        long = "members",
        value_name = "PATH",
        help = "CSV file with group,id,name rows listing each group's members"
    )]
    pub members_file: Option<PathBuf>,

    /// Identity file
    #[arg(
        long = "people",
        value_name = "PATH",
        help = "CSV file with id,name rows used to resolve display names"
    )]
    pub people_file: Option<PathBuf>,

    /// Requester whose groups the query is restricted to
    #[arg(
        long = "user",
        value_name = "ID",
        env = "SETTLE_USER",
        help = "Only consider groups this person is a member of (requires --members)"
    )]
    pub user: Option<String>,

    /// Report to produce
    #[arg(
        long = "report",
        value_name = "REPORT",
        value_enum,
        default_value_t = ReportKind::Settlements
    )]
    pub report: ReportKind,

    /// Output encoding
    #[arg(long = "format", value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// What to do with rejected expense records
    #[arg(
        long = "on-invalid",
        value_name = "POLICY",
        value_enum,
        default_value_t = InvalidRecordPolicy::Skip,
        help = "'skip' logs and ignores rejected records, 'abort' fails the query"
    )]
    pub on_invalid: InvalidRecordPolicy,

    /// Processing strategy used to aggregate the ledger
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' (single-threaded) or 'async' (group-parallel batches)"
    )]
    pub strategy: StrategyType,

    /// Number of expenses per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of expenses per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to defaults; zero values are replaced with
    /// defaults and logged.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none() && self.max_concurrent_batches.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
        )
    }

    /// Build the settlement query described by the arguments
    pub fn to_request(&self) -> SettlementRequest {
        SettlementRequest {
            input_path: self.input_file.clone(),
            members_path: self.members_file.clone(),
            people_path: self.people_file.clone(),
            requester: self.user.clone().filter(|user| !user.trim().is_empty()),
            policy: self.on_invalid,
            report: self.report,
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["settle", "expenses.csv"], StrategyType::Sync)]
    #[case::explicit_sync(&["settle", "--strategy", "sync", "expenses.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["settle", "--strategy", "async", "expenses.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::defaults(
        &["settle", "expenses.csv"],
        ReportKind::Settlements,
        OutputFormat::Csv,
        InvalidRecordPolicy::Skip
    )]
    #[case::balances_json(
        &["settle", "--report", "balances", "--format", "json", "expenses.csv"],
        ReportKind::Balances,
        OutputFormat::Json,
        InvalidRecordPolicy::Skip
    )]
    #[case::groups_abort(
        &["settle", "--report", "groups", "--on-invalid", "abort", "expenses.csv"],
        ReportKind::Groups,
        OutputFormat::Csv,
        InvalidRecordPolicy::Abort
    )]
    fn test_report_options(
        #[case] args: &[&str],
        #[case] report: ReportKind,
        #[case] format: OutputFormat,
        #[case] policy: InvalidRecordPolicy,
    ) {
        let request = CliArgs::try_parse_from(args).unwrap().to_request();
        assert_eq!(request.report, report);
        assert_eq!(request.format, format);
        assert_eq!(request.policy, policy);
    }

    #[test]
    fn test_request_paths_and_requester() {
        let args = [
            "settle",
            "--members",
            "members.csv",
            "--people",
            "people.csv",
            "--user",
            "alice",
            "expenses.csv",
        ];
        let request = CliArgs::try_parse_from(args).unwrap().to_request();

        assert_eq!(request.input_path, PathBuf::from("expenses.csv"));
        assert_eq!(request.members_path, Some(PathBuf::from("members.csv")));
        assert_eq!(request.people_path, Some(PathBuf::from("people.csv")));
        assert_eq!(request.requester.as_deref(), Some("alice"));
    }

    #[test]
    fn test_blank_user_means_unscoped() {
        let request = CliArgs::try_parse_from(["settle", "--user", " ", "expenses.csv"])
            .unwrap()
            .to_request();
        assert_eq!(request.requester, None);
    }

    #[rstest]
    #[case::all_defaults(&["settle", "expenses.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(
        &["settle", "--batch-size", "2000", "expenses.csv"],
        2000,
        num_cpus::get()
    )]
    #[case::custom_max_concurrent(&["settle", "--max-concurrent", "8", "expenses.csv"], 1000, 8)]
    #[case::zero_batch_size(
        &["settle", "--batch-size", "0", "expenses.csv"],
        1000,
        num_cpus::get()
    )]
    #[case::zero_max_concurrent(
        &["settle", "--max-concurrent", "0", "expenses.csv"],
        1000,
        num_cpus::get()
    )]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent_batches, expected_max_concurrent);
    }

    #[rstest]
    #[case::missing_input(&["settle"])]
    #[case::invalid_strategy(&["settle", "--strategy", "invalid", "expenses.csv"])]
    #[case::invalid_report(&["settle", "--report", "ledger", "expenses.csv"])]
    #[case::invalid_format(&["settle", "--format", "xml", "expenses.csv"])]
    #[case::invalid_policy(&["settle", "--on-invalid", "ignore", "expenses.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
