//! Tenure aggregator: how long current members have stayed.

use crate::{
    interval::months_between,
    resolver::current_members,
    types::MembershipRecord,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureBand {
    UnderThreeMonths,
    ThreeToSixMonths,
    SixToTwelveMonths,
    TwelvePlusMonths,
}

impl TenureBand {
    pub const ALL: [TenureBand; 4] = [
        TenureBand::UnderThreeMonths,
        TenureBand::ThreeToSixMonths,
        TenureBand::SixToTwelveMonths,
        TenureBand::TwelvePlusMonths,
    ];

    pub fn for_months(months: u32) -> Self {
        match months {
            0..=2  => Self::UnderThreeMonths,
            3..=5  => Self::ThreeToSixMonths,
            6..=11 => Self::SixToTwelveMonths,
            _      => Self::TwelvePlusMonths,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderThreeMonths  => "0-3 months",
            Self::ThreeToSixMonths  => "3-6 months",
            Self::SixToTwelveMonths => "6-12 months",
            Self::TwelvePlusMonths  => "12+ months",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenureBandCount {
    pub band:  TenureBand,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenureSummary {
    pub avg_tenure_months:     f64,
    pub longest_tenure_months: u32,
    pub distribution:          Vec<TenureBandCount>,
}

/// Whole calendar months since the membership started.
pub fn tenure_months(membership: &MembershipRecord, today: NaiveDate) -> u32 {
    months_between(today, membership.start_date)
}

pub fn summarize_tenure(memberships: &[MembershipRecord], today: NaiveDate) -> TenureSummary {
    let tenures: Vec<u32> = current_members(memberships)
        .into_iter()
        .map(|m| tenure_months(m, today))
        .collect();

    let avg_tenure_months = if tenures.is_empty() {
        0.0
    } else {
        tenures.iter().map(|t| *t as f64).sum::<f64>() / tenures.len() as f64
    };

    let distribution = TenureBand::ALL
        .iter()
        .map(|band| TenureBandCount {
            band:  *band,
            label: band.label().to_string(),
            count: tenures.iter().filter(|t| TenureBand::for_months(**t) == *band).count(),
        })
        .collect();

    TenureSummary {
        avg_tenure_months,
        longest_tenure_months: tenures.iter().copied().max().unwrap_or(0),
        distribution,
    }
}
