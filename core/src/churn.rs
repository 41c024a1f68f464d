//! Churn aggregator.
//!
//! Summary figures use a trailing window anchored at "now". The per-bucket
//! trend divides cancellations in the bucket by memberships active at the
//! bucket's first instant: of those who could have churned this period,
//! how many did.

use crate::{
    config::ChurnConfig,
    interval::{Bucket, IntervalSet},
    mrr::mrr,
    resolver::{active_at_bucket_start, current_members},
    segment::{partition_owned, SegmentKey},
    series::{series_over, SeriesPoint},
    types::{MembershipRecord, MembershipStatus, Timestamp},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnSummary {
    pub window_days:            i64,
    pub active_now:             usize,
    pub recent_cancellations:   usize,
    pub previous_cancellations: usize,
    /// recent − previous; positive means churn is accelerating.
    pub cancellation_delta:     i64,
    pub monthly_churn_rate:     f64,
    pub lost_mrr:               f64,
    pub total_churned:          usize,
    pub lifetime_churn_rate:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnPoint {
    pub label:           String,
    pub start:           Timestamp,
    pub end:             Timestamp,
    pub cancellations:   usize,
    pub active_at_start: usize,
    pub rate:            f64,
}

fn is_cancelled(m: &MembershipRecord) -> bool {
    m.status == MembershipStatus::Cancelled
}

/// Cancelled memberships whose end date lies in `[from, to]`.
pub fn cancelled_within(
    memberships: &[MembershipRecord],
    from: Timestamp,
    to: Timestamp,
) -> Vec<&MembershipRecord> {
    memberships
        .iter()
        .filter(|m| is_cancelled(m))
        .filter(|m| m.ends_at().is_some_and(|end| end >= from && end <= to))
        .collect()
}

/// Cancelled memberships whose end date lies in `[from, to)`.
fn cancelled_before(
    memberships: &[MembershipRecord],
    from: Timestamp,
    to: Timestamp,
) -> Vec<&MembershipRecord> {
    memberships
        .iter()
        .filter(|m| is_cancelled(m))
        .filter(|m| m.ends_at().is_some_and(|end| end >= from && end < to))
        .collect()
}

pub fn cancellations_in_bucket<'a>(
    memberships: &'a [MembershipRecord],
    bucket: &Bucket,
) -> Vec<&'a MembershipRecord> {
    cancelled_within(memberships, bucket.start, bucket.end)
}

/// `cancellations / (active + cancellations) * 100`. The denominator rebuilds
/// the population at the start of the window by adding back what churned.
pub fn monthly_churn_rate(recent_cancellations: usize, active_now: usize) -> f64 {
    percentage(recent_cancellations, active_now + recent_cancellations)
}

pub fn lifetime_churn_rate(total_churned: usize, active_now: usize) -> f64 {
    percentage(total_churned, active_now + total_churned)
}

pub fn total_churned(memberships: &[MembershipRecord]) -> usize {
    memberships.iter().filter(|m| m.status.is_churned()).count()
}

pub fn summarize_churn(
    memberships: &[MembershipRecord],
    now: Timestamp,
    config: &ChurnConfig,
) -> ChurnSummary {
    let window = Duration::days(config.window_days);
    let window_start = now - window;

    let recent = cancelled_within(memberships, window_start, now);
    let previous = cancelled_before(memberships, window_start - window, window_start);
    let active_now = current_members(memberships).len();
    let churned = total_churned(memberships);

    ChurnSummary {
        window_days: config.window_days,
        active_now,
        recent_cancellations: recent.len(),
        previous_cancellations: previous.len(),
        cancellation_delta: recent.len() as i64 - previous.len() as i64,
        monthly_churn_rate: monthly_churn_rate(recent.len(), active_now),
        lost_mrr: mrr(&recent),
        total_churned: churned,
        lifetime_churn_rate: lifetime_churn_rate(churned, active_now),
    }
}

/// Same summary restricted to each segment.
pub fn churn_by_segment<K: SegmentKey>(
    memberships: &[MembershipRecord],
    now: Timestamp,
    config: &ChurnConfig,
) -> BTreeMap<K, ChurnSummary> {
    partition_owned::<K>(memberships)
        .into_iter()
        .map(|(k, group)| (k, summarize_churn(&group, now, config)))
        .collect()
}

pub fn churn_trend(memberships: &[MembershipRecord], intervals: &IntervalSet) -> Vec<ChurnPoint> {
    intervals
        .buckets
        .iter()
        .map(|b| {
            let cancellations = cancellations_in_bucket(memberships, b).len();
            let active_at_start = active_at_bucket_start(memberships, b).len();
            ChurnPoint {
                label: b.label.clone(),
                start: b.start,
                end: b.end,
                cancellations,
                active_at_start,
                rate: percentage(cancellations, active_at_start),
            }
        })
        .collect()
}

pub fn cancellation_series(
    memberships: &[MembershipRecord],
    intervals: &IntervalSet,
) -> Vec<SeriesPoint> {
    series_over(intervals, |b| cancellations_in_bucket(memberships, b).len() as f64)
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
