//! MRR aggregator: recurring revenue and member counts.

use crate::{
    interval::IntervalSet,
    resolver::{active_at, active_through_bucket, current_members},
    segment::{partition, SegmentKey},
    series::{series_over, SeriesPoint},
    types::{MembershipRecord, ProgramType, Tier, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentMrr {
    pub mrr:     f64,
    pub members: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrrSummary {
    pub current_mrr:            f64,
    pub active_count:           usize,
    pub projected_annual:       f64,
    pub avg_revenue_per_member: f64,
    pub by_tier:                BTreeMap<Tier, SegmentMrr>,
    pub by_program:             BTreeMap<ProgramType, SegmentMrr>,
}

/// Sum of monthly prices. Missing prices count as zero.
pub fn mrr(members: &[&MembershipRecord]) -> f64 {
    members.iter().map(|m| m.price()).sum()
}

pub fn mrr_at(memberships: &[MembershipRecord], instant: Timestamp) -> f64 {
    mrr(&active_at(memberships, instant))
}

pub fn avg_revenue_per_member(total_mrr: f64, members: usize) -> f64 {
    if members == 0 {
        0.0
    } else {
        total_mrr / members as f64
    }
}

/// MRR and head count per segment. Every key of `K` is present.
pub fn mrr_by_segment<K: SegmentKey>(members: &[&MembershipRecord]) -> BTreeMap<K, SegmentMrr> {
    partition::<K>(members)
        .into_iter()
        .map(|(k, group)| {
            (k, SegmentMrr { mrr: mrr(&group), members: group.len() })
        })
        .collect()
}

/// Summary over memberships whose current status is active.
pub fn summarize_mrr(memberships: &[MembershipRecord]) -> MrrSummary {
    let members = current_members(memberships);
    let current_mrr = mrr(&members);
    let active_count = members.len();

    MrrSummary {
        current_mrr,
        active_count,
        projected_annual: current_mrr * 12.0,
        avg_revenue_per_member: avg_revenue_per_member(current_mrr, active_count),
        by_tier: mrr_by_segment::<Tier>(&members),
        by_program: mrr_by_segment::<ProgramType>(&members),
    }
}

/// MRR as it stood in each bucket (memberships overlapping the bucket).
pub fn mrr_series(memberships: &[MembershipRecord], intervals: &IntervalSet) -> Vec<SeriesPoint> {
    series_over(intervals, |b| mrr(&active_through_bucket(memberships, b)))
}

pub fn member_count_series(
    memberships: &[MembershipRecord],
    intervals: &IntervalSet,
) -> Vec<SeriesPoint> {
    series_over(intervals, |b| active_through_bucket(memberships, b).len() as f64)
}

/// Per-segment MRR series. Values at each index sum to `mrr_series`.
pub fn mrr_series_by_segment<K: SegmentKey>(
    memberships: &[MembershipRecord],
    intervals: &IntervalSet,
) -> BTreeMap<K, Vec<SeriesPoint>> {
    K::all()
        .iter()
        .map(|key| {
            let series = series_over(intervals, |b| {
                active_through_bucket(memberships, b)
                    .into_iter()
                    .filter(|m| K::of(m) == *key)
                    .map(|m| m.price())
                    .sum()
            });
            (*key, series)
        })
        .collect()
}

/// Memberships whose start date falls inside each bucket.
pub fn new_membership_series(
    memberships: &[MembershipRecord],
    intervals: &IntervalSet,
) -> Vec<SeriesPoint> {
    series_over(intervals, |b| {
        memberships.iter().filter(|m| b.contains(m.starts_at())).count() as f64
    })
}
