//! Per-group expense totals

use super::expense::Sequence;
use super::person::GroupId;
use rust_decimal::Decimal;
use serde::Serialize;

/// Running totals for one group, accumulated by the balance aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub group: GroupId,
    /// Number of accepted expenses
    pub expenses: usize,
    /// Sum of accepted expense amounts
    pub total: Decimal,
    /// Sequence of the group's first accepted expense
    pub first_seen: Sequence,
}

impl GroupTotal {
    pub fn new(group: impl Into<GroupId>, first_seen: Sequence) -> Self {
        GroupTotal {
            group: group.into(),
            expenses: 0,
            total: Decimal::ZERO,
            first_seen,
        }
    }
}

/// Group row of the groups report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: GroupId,
    /// Member count from the group roster (0 when no roster is loaded)
    pub members: usize,
    pub expenses: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}
