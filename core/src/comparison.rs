//! Comparison engine: re-runs the window aggregations over a second range
//! and pairs the results with the primary range.
//!
//! A percent change against a previous value of exactly zero is undefined
//! and is omitted, never reported as 0%, infinity or NaN.

use crate::{
    activity::{clients_created_in, new_client_series, purchases_in, revenue, revenue_series},
    churn::{cancelled_within, churn_trend, percentage},
    config::IntervalConfig,
    error::AnalyticsResult,
    interval::{generate_intervals, Bucket, DateRange, Granularity, IntervalSet},
    mrr::{mrr, mrr_series},
    repository::RecordSnapshot,
    resolver::active_at,
    series::SeriesPoint,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "range", rename_all = "snake_case")]
pub enum ComparisonMode {
    #[default]
    None,
    /// The span of equal length immediately before the primary range.
    PreviousPeriod,
    /// The primary span, one calendar year earlier.
    YearOverYear,
    Custom(DateRange),
}

impl ComparisonMode {
    /// The comparison range, if any. Fails when the shifted range would
    /// leave the supported calendar.
    pub fn resolve(&self, primary: &DateRange) -> AnalyticsResult<Option<DateRange>> {
        let range = match self {
            Self::None           => return Ok(None),
            Self::PreviousPeriod => primary.preceding()?,
            Self::YearOverYear   => primary.year_earlier()?,
            Self::Custom(range)  => DateRange::new(range.from, range.to)?,
        };
        Ok(Some(range))
    }
}

/// `(current - previous) / previous * 100`, or `None` when undefined.
pub fn percent_delta(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    let pct = (current - previous) / previous * 100.0;
    pct.is_finite().then_some(pct)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub current:    f64,
    pub previous:   f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
}

impl Delta {
    pub fn new(current: f64, previous: f64) -> Self {
        Self { current, previous, change_pct: percent_delta(current, previous) }
    }
}

/// Scalar aggregates over one whole date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub range:           DateRange,
    pub revenue:         f64,
    pub purchase_count:  usize,
    pub new_clients:     usize,
    pub new_memberships: usize,
    pub cancellations:   usize,
    pub active_at_start: usize,
    pub active_at_end:   usize,
    pub mrr_at_end:      f64,
    /// Cancellations in the window over members active at its first instant.
    pub churn_rate:      f64,
}

pub fn window_metrics(snapshot: &RecordSnapshot, range: &DateRange) -> WindowMetrics {
    let window = Bucket {
        start: range.start(),
        end:   range.end(),
        label: String::new(),
    };

    let purchases = purchases_in(&snapshot.purchases, &window);
    let cancellations = cancelled_within(&snapshot.memberships, window.start, window.end).len();
    let active_at_start = active_at(&snapshot.memberships, window.start).len();
    let active_end = active_at(&snapshot.memberships, window.end);

    WindowMetrics {
        range: *range,
        revenue: revenue(&purchases),
        purchase_count: purchases.len(),
        new_clients: clients_created_in(&snapshot.clients, &window).len(),
        new_memberships: snapshot
            .memberships
            .iter()
            .filter(|m| window.contains(m.starts_at()))
            .count(),
        cancellations,
        active_at_start,
        active_at_end: active_end.len(),
        mrr_at_end: mrr(&active_end),
        churn_rate: percentage(cancellations, active_at_start),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowComparison {
    pub revenue:         Delta,
    pub purchase_count:  Delta,
    pub new_clients:     Delta,
    pub new_memberships: Delta,
    pub cancellations:   Delta,
    pub active_at_end:   Delta,
    pub mrr_at_end:      Delta,
    pub churn_rate:      Delta,
}

impl WindowComparison {
    pub fn pair(current: &WindowMetrics, previous: &WindowMetrics) -> Self {
        let count = |c: usize, p: usize| Delta::new(c as f64, p as f64);
        Self {
            revenue:         Delta::new(current.revenue, previous.revenue),
            purchase_count:  count(current.purchase_count, previous.purchase_count),
            new_clients:     count(current.new_clients, previous.new_clients),
            new_memberships: count(current.new_memberships, previous.new_memberships),
            cancellations:   count(current.cancellations, previous.cancellations),
            active_at_end:   count(current.active_at_end, previous.active_at_end),
            mrr_at_end:      Delta::new(current.mrr_at_end, previous.mrr_at_end),
            churn_rate:      Delta::new(current.churn_rate, previous.churn_rate),
        }
    }
}

/// One position of two index-aligned series. Either side may be missing
/// when the two ranges produced different bucket counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedPoint {
    pub index:          usize,
    pub current_label:  Option<String>,
    pub previous_label: Option<String>,
    pub current:        Option<f64>,
    pub previous:       Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct:     Option<f64>,
}

pub fn pair_series(current: &[SeriesPoint], previous: &[SeriesPoint]) -> Vec<PairedPoint> {
    let len = current.len().max(previous.len());
    (0..len)
        .map(|i| {
            let c = current.get(i);
            let p = previous.get(i);
            let change_pct = match (c, p) {
                (Some(c), Some(p)) => percent_delta(c.value, p.value),
                _ => None,
            };
            PairedPoint {
                index: i,
                current_label: c.map(|s| s.label.clone()),
                previous_label: p.map(|s| s.label.clone()),
                current: c.map(|s| s.value),
                previous: p.map(|s| s.value),
                change_pct,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub primary_range:          DateRange,
    pub comparison_range:       DateRange,
    pub comparison_granularity: Granularity,
    pub current:                WindowMetrics,
    pub previous:               WindowMetrics,
    pub window:                 WindowComparison,
    pub mrr:                    Vec<PairedPoint>,
    pub revenue:                Vec<PairedPoint>,
    pub new_clients:            Vec<PairedPoint>,
    pub churn_rate:             Vec<PairedPoint>,
}

fn churn_rate_series(snapshot: &RecordSnapshot, intervals: &IntervalSet) -> Vec<SeriesPoint> {
    churn_trend(&snapshot.memberships, intervals)
        .into_iter()
        .map(|p| SeriesPoint { label: p.label, start: p.start, end: p.end, value: p.rate })
        .collect()
}

/// Compare `primary` against `comparison_range`, bucketing the comparison
/// range on its own.
pub fn compare(
    snapshot: &RecordSnapshot,
    primary: &IntervalSet,
    comparison_range: &DateRange,
    config: &IntervalConfig,
) -> ComparisonReport {
    let secondary = generate_intervals(comparison_range, config);
    if secondary.granularity != primary.granularity {
        log::debug!(
            "comparison granularity {:?} differs from primary {:?}",
            secondary.granularity, primary.granularity,
        );
    }

    let current = window_metrics(snapshot, &primary.range);
    let previous = window_metrics(snapshot, comparison_range);

    ComparisonReport {
        primary_range: primary.range,
        comparison_range: *comparison_range,
        comparison_granularity: secondary.granularity,
        window: WindowComparison::pair(&current, &previous),
        current,
        previous,
        mrr: pair_series(
            &mrr_series(&snapshot.memberships, primary),
            &mrr_series(&snapshot.memberships, &secondary),
        ),
        revenue: pair_series(
            &revenue_series(&snapshot.purchases, primary),
            &revenue_series(&snapshot.purchases, &secondary),
        ),
        new_clients: pair_series(
            &new_client_series(&snapshot.clients, primary),
            &new_client_series(&snapshot.clients, &secondary),
        ),
        churn_rate: pair_series(
            &churn_rate_series(snapshot, primary),
            &churn_rate_series(snapshot, &secondary),
        ),
    }
}
