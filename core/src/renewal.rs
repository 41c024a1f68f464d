//! Renewal tracking.
//!
//! `renewal_success_rate` looks at the *current* status of memberships whose
//! renewal date fell in the lookback window, not their status at the renewal
//! moment. The stored fields cannot reconstruct the latter.

use crate::{
    churn::percentage,
    config::RenewalConfig,
    types::{MembershipRecord, MembershipStatus, RecordId},
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingRenewal {
    pub membership_id: RecordId,
    pub client_id:     RecordId,
    pub renewal_date:  NaiveDate,
    pub monthly_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalSummary {
    pub upcoming:             Vec<UpcomingRenewal>,
    pub upcoming_count:       usize,
    pub mrr_at_risk:          f64,
    pub recent_renewals:      usize,
    pub renewed_count:        usize,
    pub renewal_success_rate: f64,
}

pub fn summarize_renewals(
    memberships: &[MembershipRecord],
    today: NaiveDate,
    config: &RenewalConfig,
) -> RenewalSummary {
    let horizon_end = today + Days::new(config.upcoming_horizon_days.max(0) as u64);
    let lookback_start = today - Days::new(config.lookback_days.max(0) as u64);

    let mut upcoming: Vec<UpcomingRenewal> = memberships
        .iter()
        .filter(|m| m.renewal_date.is_some_and(|r| r >= today && r <= horizon_end))
        .map(|m| UpcomingRenewal {
            membership_id: m.id.clone(),
            client_id:     m.client_id.clone(),
            renewal_date:  m.renewal_date.unwrap_or(today),
            monthly_price: m.price(),
        })
        .collect();
    upcoming.sort_by(|a, b| {
        a.renewal_date
            .cmp(&b.renewal_date)
            .then_with(|| a.membership_id.cmp(&b.membership_id))
    });

    let recent: Vec<&MembershipRecord> = memberships
        .iter()
        .filter(|m| m.renewal_date.is_some_and(|r| r >= lookback_start && r < today))
        .collect();
    let renewed = recent
        .iter()
        .filter(|m| m.status == MembershipStatus::Active)
        .count();

    RenewalSummary {
        upcoming_count: upcoming.len(),
        mrr_at_risk: upcoming.iter().map(|u| u.monthly_price).sum(),
        upcoming,
        recent_renewals: recent.len(),
        renewed_count: renewed,
        renewal_success_rate: percentage(renewed, recent.len()),
    }
}
