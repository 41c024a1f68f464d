//! Retention aggregator.
//!
//! Lifetime retention is derived directly from head counts here and is
//! deliberately not written as `100 - lifetime_churn_rate`. The two must
//! stay separate derivations; the churn-complement test in
//! `tests/retention.rs` pins them together.

use crate::{
    churn::{percentage, total_churned, ChurnSummary},
    resolver::current_members,
    types::MembershipRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionSummary {
    pub active_now:             usize,
    pub total_churned:          usize,
    pub retention_rate:         f64,
    pub monthly_retention_rate: f64,
}

/// `active / (active + churned) * 100`, or 0 with no population.
pub fn retention_rate(active_now: usize, total_churned: usize) -> f64 {
    percentage(active_now, active_now + total_churned)
}

pub fn monthly_retention_rate(monthly_churn_rate: f64) -> f64 {
    100.0 - monthly_churn_rate
}

pub fn summarize_retention(memberships: &[MembershipRecord], churn: &ChurnSummary) -> RetentionSummary {
    let active_now = current_members(memberships).len();
    let churned = total_churned(memberships);
    RetentionSummary {
        active_now,
        total_churned: churned,
        retention_rate: retention_rate(active_now, churned),
        monthly_retention_rate: monthly_retention_rate(churn.monthly_churn_rate),
    }
}
