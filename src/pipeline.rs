//! End-to-end settlement query
//!
//! One call answers one query: load the roster files, work out which groups
//! the requester may see, aggregate the ledger with the chosen strategy, and
//! write the requested report.

use crate::core::{DebtSimplifier, GroupScope, InvalidRecordPolicy};
use crate::io::roster::load_directory;
use crate::report::{OutputFormat, Report, ReportKind};
use crate::strategy::ProcessingStrategy;
use crate::types::SettlementError;
use std::io::Write;
use std::path::PathBuf;

/// Everything needed to answer one settlement query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementRequest {
    /// Expenses ledger
    pub input_path: PathBuf,
    /// Group roster (`group,id,name`)
    pub members_path: Option<PathBuf>,
    /// Identity store (`id,name`)
    pub people_path: Option<PathBuf>,
    /// Restrict the query to groups this person belongs to
    pub requester: Option<String>,
    pub policy: InvalidRecordPolicy,
    pub report: ReportKind,
    pub format: OutputFormat,
}

/// Run a settlement query and write its report to `output`
///
/// The built report is returned as well, so callers can inspect a residual
/// imbalance through [`Report::warning`]; it is also logged as a warning.
///
/// # Errors
///
/// - `FileNotFound`/`IoError` if the ledger or a roster file cannot be opened
/// - `MissingRoster` if a requester is given without a members file
/// - Any record error under the abort policy
/// - `IoError`/`SerializationError` if the report cannot be written
pub fn run(
    request: &SettlementRequest,
    strategy: &dyn ProcessingStrategy,
    output: &mut dyn Write,
) -> Result<Report, SettlementError> {
    let directory =
        load_directory(request.members_path.as_deref(), request.people_path.as_deref())?;
    let scope = directory.scope_for(request.requester.as_deref())?;
    if let (Some(requester), GroupScope::Only(groups)) = (&request.requester, &scope) {
        tracing::debug!(%requester, groups = groups.len(), "scoped query to requester's groups");
    }

    let snapshot = strategy.aggregate(&request.input_path, &scope, request.policy)?;
    let report = Report::build(request.report, &snapshot, &directory, &DebtSimplifier::new());
    if let Some(warning) = report.warning() {
        tracing::warn!(%warning, "settlement left a residual balance");
    }

    report.write(request.format, output)?;
    tracing::info!(rows = report.len(), report = ?request.report, "wrote report");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SyncProcessingStrategy;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn ledger() -> NamedTempFile {
        create_temp_csv("group,payer,amount,participants\ng1,a,50,a;b\ng2,c,30,b;c\n")
    }

    fn run_to_string(request: &SettlementRequest) -> Result<String, SettlementError> {
        let mut output = Vec::new();
        run(request, &SyncProcessingStrategy, &mut output)?;
        Ok(String::from_utf8(output).expect("report is utf-8"))
    }

    #[test]
    fn test_run_unscoped() {
        let input = ledger();
        let request = SettlementRequest {
            input_path: input.path().to_path_buf(),
            ..Default::default()
        };

        assert_eq!(
            run_to_string(&request).unwrap(),
            "from_id,from_name,to_id,to_name,amount\n\
             b,Unknown,a,Unknown,25.00\n\
             b,Unknown,c,Unknown,15.00\n"
        );
    }

    #[test]
    fn test_run_scoped_to_requester() {
        let input = ledger();
        let members =
            create_temp_csv("group,id,name\ng1,a,Alice\ng1,b,Bob\ng2,b,Bob\ng2,c,Carol\n");
        let request = SettlementRequest {
            input_path: input.path().to_path_buf(),
            members_path: Some(members.path().to_path_buf()),
            requester: Some("a".to_string()),
            ..Default::default()
        };

        assert_eq!(
            run_to_string(&request).unwrap(),
            "from_id,from_name,to_id,to_name,amount\nb,Bob,a,Alice,25.00\n"
        );
    }

    #[test]
    fn test_run_returns_written_report() {
        let input = ledger();
        let request = SettlementRequest {
            input_path: input.path().to_path_buf(),
            ..Default::default()
        };

        let mut output = Vec::new();
        let report = run(&request, &SyncProcessingStrategy, &mut output).unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.warning(), None);
    }

    #[test]
    fn test_run_requester_without_roster() {
        let input = ledger();
        let request = SettlementRequest {
            input_path: input.path().to_path_buf(),
            requester: Some("a".to_string()),
            ..Default::default()
        };

        assert_eq!(run_to_string(&request).unwrap_err(), SettlementError::missing_roster("a"));
    }

    #[test]
    fn test_run_requester_in_no_group() {
        let input = ledger();
        let members = create_temp_csv("group,id,name\ng1,a,Alice\n");
        let request = SettlementRequest {
            input_path: input.path().to_path_buf(),
            members_path: Some(members.path().to_path_buf()),
            requester: Some("z".to_string()),
            report: ReportKind::Balances,
            ..Default::default()
        };

        assert_eq!(run_to_string(&request).unwrap(), "id,name,balance\n");
    }
}
