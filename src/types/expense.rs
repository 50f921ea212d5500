//! Expense-related types for the settlement engine
//!
//! This module defines the expense record consumed by the balance aggregator
//! and the per-person balance changes an expense implies.

use super::balance::FirstSeen;
use super::error::SettlementError;
use super::person::{GroupId, PersonId};
use rust_decimal::Decimal;

/// Position of a record in the expense ledger (0-based, data rows only)
pub type Sequence = u64;

/// How an expense is divided among its participants
///
/// Only equal splits exist; weighted splits are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitType {
    /// Every participant owes the same share
    #[default]
    Equal,
}

/// A single shared expense as supplied by the expense ledger
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    /// Position in the ledger, used for deterministic ordering
    pub sequence: Sequence,

    /// Group that owns the expense
    pub group: GroupId,

    /// Free-form description, if the ledger carries one
    pub description: Option<String>,

    /// Non-negative amount advanced by the payer
    pub amount: Decimal,

    /// Person who advanced the money
    pub payer: PersonId,

    /// Persons the expense is split between (may include the payer)
    ///
    /// Set semantics: duplicates are collapsed on construction, keeping the
    /// first occurrence.
    pub participants: Vec<PersonId>,

    pub split_type: SplitType,
}

/// Change to one person's balance implied by an expense
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceDelta<'a> {
    pub person: &'a PersonId,
    pub first_seen: FirstSeen,
    pub amount: Decimal,
}

impl ExpenseRecord {
    /// Create an equal-split expense record
    pub fn new(
        sequence: Sequence,
        group: impl Into<GroupId>,
        amount: Decimal,
        payer: impl Into<PersonId>,
        participants: impl IntoIterator<Item = impl Into<PersonId>>,
    ) -> Self {
        let mut unique: Vec<PersonId> = Vec::new();
        for participant in participants {
            let participant = participant.into();
            if !unique.contains(&participant) {
                unique.push(participant);
            }
        }

        ExpenseRecord {
            sequence,
            group: group.into(),
            description: None,
            amount,
            payer: payer.into(),
            participants: unique,
            split_type: SplitType::Equal,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Equal share owed by each participant
    ///
    /// # Errors
    ///
    /// - `InvalidExpense` when there are no participants
    /// - `ArithmeticOverflow` if the division cannot be represented
    pub fn share(&self) -> Result<Decimal, SettlementError> {
        if self.participants.is_empty() {
            return Err(SettlementError::invalid_expense(self.sequence, &self.group));
        }

        let count = Decimal::from(self.participants.len());
        self.amount
            .checked_div(count)
            .ok_or_else(|| SettlementError::arithmetic_overflow("share", &self.group))
    }

    /// Balance changes implied by this expense
    ///
    /// The payer is credited with the full amount and every participant is
    /// debited one share. A payer who is also a participant receives a single
    /// combined delta of `amount - share`.
    pub fn deltas(&self) -> Result<Vec<BalanceDelta<'_>>, SettlementError> {
        let share = self.share()?;

        let mut deltas = Vec::with_capacity(self.participants.len() + 1);
        deltas.push(BalanceDelta {
            person: &self.payer,
            first_seen: FirstSeen::new(self.sequence, 0),
            amount: self.amount,
        });

        for (index, participant) in self.participants.iter().enumerate() {
            if let Some(existing) = deltas.iter_mut().find(|d| d.person == participant) {
                existing.amount = existing
                    .amount
                    .checked_sub(share)
                    .ok_or_else(|| SettlementError::arithmetic_overflow("debit", participant))?;
                continue;
            }
            deltas.push(BalanceDelta {
                person: participant,
                first_seen: FirstSeen::new(self.sequence, index + 1),
                amount: -share,
            });
        }

        Ok(deltas)
    }
}
