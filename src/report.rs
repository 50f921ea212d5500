//! Report building and rendering
//!
//! Turns an aggregated ledger into one of three reports and writes it as CSV
//! or JSON:
//!
//! - **settlements**: the simplified payment list
//! - **balances**: every person's net balance, in first-appearance order
//! - **groups**: member count, accepted expenses and total per group
//!
//! Names are resolved through the [`Directory`] here, once, at the edge.

use crate::core::{DebtSimplifier, Directory, LedgerSnapshot};
use crate::io::csv_format::{write_balances_csv, write_group_summaries_csv, write_settlements_csv};
use crate::types::{
    round_money, ConsistencyWarning, GroupSummary, PersonBalance, SettlementError, SettlementPlan,
};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

/// Which report to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportKind {
    #[default]
    Settlements,
    Balances,
    Groups,
}

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// A built report, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// The payment list and any residual the simplifier could not settle
    Settlements(SettlementPlan),
    Balances(Vec<PersonBalance>),
    Groups(Vec<GroupSummary>),
}

impl Report {
    /// Build a report of `kind` from an aggregated ledger
    ///
    /// Building a settlements report runs the debt simplifier. A residual it
    /// leaves behind stays in the report (see [`Report::warning`]) and does
    /// not fail it.
    pub fn build(
        kind: ReportKind,
        snapshot: &LedgerSnapshot,
        directory: &Directory,
        simplifier: &DebtSimplifier,
    ) -> Self {
        match kind {
            ReportKind::Settlements => {
                Report::Settlements(simplifier.simplify(&snapshot.balances, directory))
            }
            ReportKind::Balances => Report::Balances(
                snapshot
                    .balances
                    .iter()
                    .map(|entry| PersonBalance {
                        person: directory.resolve(&entry.person),
                        balance: round_money(entry.balance),
                    })
                    .collect(),
            ),
            ReportKind::Groups => Report::Groups(
                snapshot
                    .groups
                    .iter()
                    .map(|group| GroupSummary {
                        group: group.group.clone(),
                        members: directory.member_count(&group.group),
                        expenses: group.expenses,
                        total: round_money(group.total),
                    })
                    .collect(),
            ),
        }
    }

    /// Number of rows in the report
    pub fn len(&self) -> usize {
        match self {
            Report::Settlements(plan) => plan.settlements.len(),
            Report::Balances(rows) => rows.len(),
            Report::Groups(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Residual imbalance left by the simplifier, for settlements reports
    pub fn warning(&self) -> Option<&ConsistencyWarning> {
        match self {
            Report::Settlements(plan) => plan.warning.as_ref(),
            Report::Balances(_) | Report::Groups(_) => None,
        }
    }

    /// Write the report to `output`
    ///
    /// CSV output carries a header row even when the report is empty; JSON
    /// output is a (possibly empty) array followed by a newline.
    pub fn write(
        &self,
        format: OutputFormat,
        output: &mut dyn Write,
    ) -> Result<(), SettlementError> {
        match (format, self) {
            (OutputFormat::Csv, Report::Settlements(plan)) => {
                write_settlements_csv(&plan.settlements, output)
            }
            (OutputFormat::Csv, Report::Balances(rows)) => write_balances_csv(rows, output),
            (OutputFormat::Csv, Report::Groups(rows)) => write_group_summaries_csv(rows, output),
            (OutputFormat::Json, Report::Settlements(plan)) => {
                write_json(&plan.settlements, output)
            }
            (OutputFormat::Json, Report::Balances(rows)) => write_json(rows, output),
            (OutputFormat::Json, Report::Groups(rows)) => write_json(rows, output),
        }
    }
}

fn write_json<T: Serialize>(rows: &[T], output: &mut dyn Write) -> Result<(), SettlementError> {
    serde_json::to_writer_pretty(&mut *output, rows)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
