//! CSV format handling for ledger input and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for the expenses, members and people files
//! - Conversion from expense rows to domain types
//! - Report serialization (settlements, balances, group summaries)
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{
    round_money, ExpenseRecord, GroupSummary, PersonBalance, Sequence, Settlement,
    SettlementError, SplitType,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Separator between identifiers in the `participants` column
pub const PARTICIPANT_SEPARATOR: char = ';';

/// Expense row as found in the ledger file
///
/// Columns: group, payer, amount, participants, and optionally description and
/// split_type. Amount is kept as a string so malformed values can be reported
/// with their original text.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvExpenseRecord {
    pub group: String,
    pub payer: String,
    pub amount: String,
    #[serde(default)]
    pub participants: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub split_type: Option<String>,
}

/// Group roster row: one member of one group
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvMemberRecord {
    pub group: String,
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Identity store row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvPersonRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Convert a CsvExpenseRecord to an ExpenseRecord
///
/// This function:
/// - Parses the amount into a Decimal and rejects negative values
/// - Splits the participants column on `;`, dropping blank entries
/// - Accepts an empty or `equal` split type (case-insensitive)
///
/// An empty participant list is accepted here; the aggregator rejects it.
///
/// # Errors
///
/// - `InvalidAmount` if the amount is missing, malformed or negative
/// - `UnsupportedSplitType` for any split type other than equal
pub fn convert_csv_record(
    csv_record: CsvExpenseRecord,
    sequence: Sequence,
) -> Result<ExpenseRecord, SettlementError> {
    let amount_str = csv_record.amount.trim();
    let amount = match Decimal::from_str(amount_str) {
        Ok(amount) if !amount.is_sign_negative() || amount.is_zero() => amount,
        _ => return Err(SettlementError::invalid_amount(&csv_record.amount, sequence)),
    };

    let split_type = match csv_record.split_type.as_deref().map(str::trim) {
        None | Some("") => SplitType::Equal,
        Some(s) if s.eq_ignore_ascii_case("equal") => SplitType::Equal,
        Some(s) => return Err(SettlementError::unsupported_split_type(s, sequence)),
    };

    let participants: Vec<String> = csv_record
        .participants
        .as_deref()
        .unwrap_or_default()
        .split(PARTICIPANT_SEPARATOR)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    let mut record = ExpenseRecord::new(
        sequence,
        csv_record.group.trim(),
        amount,
        csv_record.payer.trim(),
        participants,
    );
    record.split_type = split_type;
    if let Some(description) = csv_record.description.filter(|d| !d.trim().is_empty()) {
        record = record.with_description(description);
    }

    Ok(record)
}

fn flush_writer<W: Write>(mut writer: csv::Writer<W>) -> Result<(), SettlementError> {
    writer.flush()?;
    Ok(())
}

/// Write settlements as CSV
///
/// Columns: from_id, from_name, to_id, to_name, amount (2 decimal places).
/// Rows are written in the order given.
pub fn write_settlements_csv(
    settlements: &[Settlement],
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["from_id", "from_name", "to_id", "to_name", "amount"])?;
    for settlement in settlements {
        let amount = format!("{:.2}", round_money(settlement.amount));
        writer.write_record([
            settlement.from.id.as_str(),
            settlement.from.name.as_str(),
            settlement.to.id.as_str(),
            settlement.to.name.as_str(),
            amount.as_str(),
        ])?;
    }

    flush_writer(writer)
}

/// Write net balances as CSV
///
/// Columns: id, name, balance (2 decimal places, negative when owing).
pub fn write_balances_csv(
    balances: &[PersonBalance],
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["id", "name", "balance"])?;
    for row in balances {
        let balance = format!("{:.2}", round_money(row.balance));
        writer.write_record([
            row.person.id.as_str(),
            row.person.name.as_str(),
            balance.as_str(),
        ])?;
    }

    flush_writer(writer)
}

/// Write group summaries as CSV
///
/// Columns: group, members, expenses, total (2 decimal places).
pub fn write_group_summaries_csv(
    groups: &[GroupSummary],
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["group", "members", "expenses", "total"])?;
    for group in groups {
        writer.write_record([
            group.group.clone(),
            group.members.to_string(),
            group.expenses.to_string(),
            format!("{:.2}", round_money(group.total)),
        ])?;
    }

    flush_writer(writer)
}
