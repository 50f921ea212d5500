//! Settlement output types

use super::person::Person;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;

/// Number of decimal places money is reported with
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Round an amount for output (half away from zero, never negative zero)
pub fn round_money(amount: Decimal) -> Decimal {
    let rounded =
        amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// A single directed payment: `from` pays `to` the given amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub from: Person,
    pub to: Person,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Balance left over after simplification
///
/// Only non-zero-sum input produces this (for example a participant debited in
/// a group they were later removed from). It is reported, never raised.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyWarning {
    /// Debt that no creditor was left to receive
    pub unsettled_debt: Decimal,
    /// Credit that no debtor was left to pay
    pub unsettled_credit: Decimal,
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "balances do not net to zero: {:.2} unsettled debt, {:.2} unsettled credit",
            round_money(self.unsettled_debt),
            round_money(self.unsettled_credit)
        )
    }
}

/// Output of the debt simplifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementPlan {
    pub settlements: Vec<Settlement>,
    pub warning: Option<ConsistencyWarning>,
}
