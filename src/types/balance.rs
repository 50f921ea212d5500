//! Net balance types
//!
//! A [`BalanceSheet`] is the output of the balance aggregator: one signed
//! amount per person, positive when the person is owed money and negative when
//! they owe it. Entries keep the order in which persons first appeared in the
//! ledger, which is the iteration order the debt simplifier relies on for
//! deterministic tie-breaking.

use super::expense::Sequence;
use super::person::{Person, PersonId};
use rust_decimal::Decimal;
use serde::Serialize;

/// Where a person was first seen in the ledger
///
/// `slot` is 0 for the payer of the record and `1 + index` for participants,
/// so within one record the payer always comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirstSeen {
    pub sequence: Sequence,
    pub slot: usize,
}

impl FirstSeen {
    pub fn new(sequence: Sequence, slot: usize) -> Self {
        FirstSeen { sequence, slot }
    }
}

/// Net balance of one person
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEntry {
    pub person: PersonId,
    pub balance: Decimal,
    pub first_seen: FirstSeen,
}

/// Net balances of every person touched by a set of expenses
///
/// Persons without an entry are implicitly settled (zero).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheet {
    entries: Vec<BalanceEntry>,
}

impl BalanceSheet {
    /// Build a sheet, ordering entries by first appearance
    pub fn from_entries(mut entries: Vec<BalanceEntry>) -> Self {
        entries.sort_by_key(|entry| entry.first_seen);
        BalanceSheet { entries }
    }

    /// Balance of `person`, zero when the person never appeared
    pub fn get(&self, person: &str) -> Decimal {
        self.entries
            .iter()
            .find(|entry| entry.person == person)
            .map(|entry| entry.balance)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all balances; zero for a consistent ledger
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|entry| entry.balance).sum()
    }
}

/// A balance row with the person's display name resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonBalance {
    #[serde(flatten)]
    pub person: Person,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}
