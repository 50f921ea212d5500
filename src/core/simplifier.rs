//! Debt simplification
//!
//! This module provides the `DebtSimplifier`, which turns a balance sheet into
//! a short list of directed payments using greedy largest-pair matching:
//!
//! 1. Split persons into debtors and creditors, dropping near-zero balances
//! 2. Sort both lists by amount, largest first (stable)
//! 3. Repeatedly match the head debtor with the head creditor for the smaller
//!    of the two amounts, advancing past whichever side is settled
//!
//! Only list heads are ever removed and the lists are never re-sorted after a
//! partial decrement, so a head can end up smaller than the entry behind it.
//! That is the accepted behavior of the heuristic; the result is deterministic
//! but not guaranteed to use the fewest possible payments.

use crate::core::directory::Directory;
use crate::types::{
    round_money, BalanceSheet, ConsistencyWarning, PersonId, Settlement, SettlementPlan,
};
use rust_decimal::Decimal;

/// Tolerance below which a balance or a transfer counts as settled (0.01)
pub const SETTLEMENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One side of a pending payment
#[derive(Debug, Clone)]
struct Party<'a> {
    person: &'a PersonId,
    amount: Decimal,
}

/// Greedy debt simplifier
#[derive(Debug, Clone)]
pub struct DebtSimplifier {
    epsilon: Decimal,
}

impl Default for DebtSimplifier {
    fn default() -> Self {
        Self {
            epsilon: SETTLEMENT_EPSILON,
        }
    }
}

impl DebtSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the payments that settle `sheet`
    ///
    /// Display names are resolved through `directory`; unknown identifiers are
    /// labeled "Unknown". Residual imbalance is returned as a warning in the
    /// plan, never raised.
    pub fn simplify(&self, sheet: &BalanceSheet, directory: &Directory) -> SettlementPlan {
        let (mut debtors, mut creditors) = self.partition(sheet);

        let mut settlements = Vec::new();
        let mut debtor_head = 0;
        let mut creditor_head = 0;

        while debtor_head < debtors.len() && creditor_head < creditors.len() {
            let transfer = debtors[debtor_head]
                .amount
                .min(creditors[creditor_head].amount);

            if transfer > self.epsilon {
                settlements.push(Settlement {
                    from: directory.resolve(debtors[debtor_head].person),
                    to: directory.resolve(creditors[creditor_head].person),
                    amount: round_money(transfer),
                });
            }

            debtors[debtor_head].amount -= transfer;
            creditors[creditor_head].amount -= transfer;

            if debtors[debtor_head].amount < self.epsilon {
                debtor_head += 1;
            }
            if creditors[creditor_head].amount < self.epsilon {
                creditor_head += 1;
            }
        }

        let unsettled_debt: Decimal = debtors[debtor_head..].iter().map(|p| p.amount).sum();
        let unsettled_credit: Decimal = creditors[creditor_head..].iter().map(|p| p.amount).sum();

        let warning = if unsettled_debt >= self.epsilon || unsettled_credit >= self.epsilon {
            Some(ConsistencyWarning {
                unsettled_debt,
                unsettled_credit,
            })
        } else {
            None
        };

        tracing::debug!(
            persons = sheet.len(),
            settlements = settlements.len(),
            "simplified debts"
        );

        SettlementPlan {
            settlements,
            warning,
        }
    }

    /// Split a sheet into debtors and creditors, each sorted largest first
    fn partition<'a>(&self, sheet: &'a BalanceSheet) -> (Vec<Party<'a>>, Vec<Party<'a>>) {
        let mut debtors = Vec::new();
        let mut creditors = Vec::new();

        for entry in sheet.iter() {
            if entry.balance.abs() < self.epsilon {
                continue;
            }
            let party = Party {
                person: &entry.person,
                amount: entry.balance.abs(),
            };
            if entry.balance.is_sign_negative() {
                debtors.push(party);
            } else {
                creditors.push(party);
            }
        }

        // sort_by is stable: equal amounts keep first-appearance order
        debtors.sort_by(|a, b| b.amount.cmp(&a.amount));
        creditors.sort_by(|a, b| b.amount.cmp(&a.amount));

        (debtors, creditors)
    }
}

/// Compute settlements for a balance sheet with the default tolerance
pub fn simplify(sheet: &BalanceSheet, directory: &Directory) -> SettlementPlan {
    DebtSimplifier::default().simplify(sheet, directory)
}
