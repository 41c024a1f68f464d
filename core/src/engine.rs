//! The analytics engine: one full, independent dashboard pass.
//!
//! PIPELINE (fixed order, every pass re-derives from the snapshot):
//!   1. Interval generator    (primary range)
//!   2. Metric aggregators    (MRR, churn, retention, tenure, renewal)
//!   3. Trend series          (per bucket)
//!   4. Comparison engine     (optional second range)
//!   5. Forecast engine
//!
//! RULES:
//!   - No state survives between passes. All parameters arrive in the request.
//!   - Drill-downs regenerate buckets from the same request, so a chart point
//!     and its drill-down share exact boundaries.

use crate::{
    activity::{
        cumulative_client_series, marketing_funnel, new_client_series, revenue_series,
        revenue_series_by_category, FunnelStage,
    },
    churn::{cancellation_series, churn_by_segment, churn_trend, summarize_churn, ChurnPoint, ChurnSummary},
    comparison::{compare, ComparisonMode, ComparisonReport},
    config::AnalyticsConfig,
    drilldown::{drill_down, DrillDown, DrillDownKind},
    error::{AnalyticsError, AnalyticsResult},
    forecast::{forecast_revenue, RevenueForecast},
    interval::{generate_intervals, is_supported, DateRange, IntervalSet, SUPPORTED_YEARS},
    mrr::{member_count_series, mrr_series, mrr_series_by_segment, new_membership_series, summarize_mrr, MrrSummary},
    renewal::{summarize_renewals, RenewalSummary},
    repository::{RecordRepository, RecordSnapshot},
    retention::{summarize_retention, RetentionSummary},
    series::SeriesPoint,
    tenure::{summarize_tenure, TenureSummary},
    types::{ProgramType, RevenueCategory, Tier, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest forecast horizon a request may ask for.
pub const MAX_FORECAST_HORIZON_MONTHS: u32 = 36;

/// Everything that parameterizes one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub range:            DateRange,
    #[serde(default)]
    pub comparison:       ComparisonMode,
    /// The instant "current" metrics are anchored at.
    pub now:              Timestamp,
    /// Overrides the configured forecast horizon.
    #[serde(default)]
    pub forecast_horizon: Option<u32>,
}

impl DashboardRequest {
    pub fn new(range: DateRange, now: Timestamp) -> Self {
        Self { range, comparison: ComparisonMode::None, now, forecast_horizon: None }
    }

    pub fn with_comparison(mut self, comparison: ComparisonMode) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn with_forecast_horizon(mut self, months: u32) -> Self {
        self.forecast_horizon = Some(months);
        self
    }

    fn validate(&self) -> AnalyticsResult<()> {
        // Requests may arrive deserialized, bypassing DateRange::new.
        DateRange::new(self.range.from, self.range.to)?;
        self.comparison.resolve(&self.range)?;
        if !is_supported(self.now.date()) {
            return Err(AnalyticsError::InvalidParameter {
                name: "now",
                reason: format!("{} is outside years {:?}", self.now, SUPPORTED_YEARS),
            });
        }
        if let Some(h) = self.forecast_horizon {
            if h > MAX_FORECAST_HORIZON_MONTHS {
                return Err(AnalyticsError::InvalidParameter {
                    name: "forecast_horizon",
                    reason: format!("{h} exceeds {MAX_FORECAST_HORIZON_MONTHS} months"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub mrr:                 Vec<SeriesPoint>,
    pub members:             Vec<SeriesPoint>,
    pub new_memberships:     Vec<SeriesPoint>,
    pub cancellations:       Vec<SeriesPoint>,
    pub churn:               Vec<ChurnPoint>,
    pub mrr_by_tier:         BTreeMap<Tier, Vec<SeriesPoint>>,
    pub mrr_by_program:      BTreeMap<ProgramType, Vec<SeriesPoint>>,
    pub revenue:             Vec<SeriesPoint>,
    pub revenue_by_category: BTreeMap<RevenueCategory, Vec<SeriesPoint>>,
    pub new_clients:         Vec<SeriesPoint>,
    pub cumulative_clients:  Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_for:    Timestamp,
    pub intervals:        IntervalSet,
    pub mrr:              MrrSummary,
    pub churn:            ChurnSummary,
    pub churn_by_tier:    BTreeMap<Tier, ChurnSummary>,
    pub churn_by_program: BTreeMap<ProgramType, ChurnSummary>,
    pub retention:        RetentionSummary,
    pub tenure:           TenureSummary,
    pub renewals:         RenewalSummary,
    pub funnel:           Vec<FunnelStage>,
    pub trends:           TrendSeries,
    pub comparison:       Option<ComparisonReport>,
    pub forecast:         RevenueForecast,
}

pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn intervals(&self, range: &DateRange) -> IntervalSet {
        generate_intervals(range, &self.config.intervals)
    }

    /// Fetch a fresh snapshot from `repo` and run a pass over it.
    pub fn load_and_compute<R: RecordRepository + ?Sized>(
        &self,
        repo: &R,
        request: &DashboardRequest,
    ) -> AnalyticsResult<DashboardReport> {
        let snapshot = RecordSnapshot::load(repo)?;
        self.compute(&snapshot, request)
    }

    pub fn compute(
        &self,
        snapshot: &RecordSnapshot,
        request: &DashboardRequest,
    ) -> AnalyticsResult<DashboardReport> {
        request.validate()?;

        let now = request.now;
        let today = now.date();
        let memberships = &snapshot.memberships;
        let intervals = self.intervals(&request.range);

        let mrr = summarize_mrr(memberships);
        let churn = summarize_churn(memberships, now, &self.config.churn);
        let retention = summarize_retention(memberships, &churn);

        let trends = TrendSeries {
            mrr:                 mrr_series(memberships, &intervals),
            members:             member_count_series(memberships, &intervals),
            new_memberships:     new_membership_series(memberships, &intervals),
            cancellations:       cancellation_series(memberships, &intervals),
            churn:               churn_trend(memberships, &intervals),
            mrr_by_tier:         mrr_series_by_segment::<Tier>(memberships, &intervals),
            mrr_by_program:      mrr_series_by_segment::<ProgramType>(memberships, &intervals),
            revenue:             revenue_series(&snapshot.purchases, &intervals),
            revenue_by_category: revenue_series_by_category(&snapshot.purchases, &intervals),
            new_clients:         new_client_series(&snapshot.clients, &intervals),
            cumulative_clients:  cumulative_client_series(&snapshot.clients, &intervals),
        };

        let comparison = request
            .comparison
            .resolve(&request.range)?
            .map(|range| compare(snapshot, &intervals, &range, &self.config.intervals));

        let mut forecast_config = self.config.forecast.clone();
        if let Some(h) = request.forecast_horizon {
            forecast_config.horizon_months = h;
        }
        let forecast = forecast_revenue(&snapshot.purchases, mrr.current_mrr, today, &forecast_config);

        log::debug!(
            "dashboard pass: {} buckets, mrr={:.2}, churn={:.1}%, comparison={}",
            intervals.len(),
            mrr.current_mrr,
            churn.monthly_churn_rate,
            comparison.is_some(),
        );

        Ok(DashboardReport {
            generated_for: now,
            churn_by_tier: churn_by_segment::<Tier>(memberships, now, &self.config.churn),
            churn_by_program: churn_by_segment::<ProgramType>(memberships, now, &self.config.churn),
            tenure: summarize_tenure(memberships, today),
            renewals: summarize_renewals(memberships, today, &self.config.renewal),
            funnel: marketing_funnel(&snapshot.clients, request.range.end()),
            intervals,
            mrr,
            churn,
            retention,
            trends,
            comparison,
            forecast,
        })
    }

    /// Drill into bucket `bucket_index` of the request's primary range.
    pub fn drill_down(
        &self,
        snapshot: &RecordSnapshot,
        request: &DashboardRequest,
        bucket_index: usize,
        kind: DrillDownKind,
    ) -> AnalyticsResult<DrillDown> {
        request.validate()?;
        let intervals = self.intervals(&request.range);
        let bucket = intervals.buckets.get(bucket_index).ok_or_else(|| {
            AnalyticsError::InvalidParameter {
                name: "bucket_index",
                reason: format!("{bucket_index} is outside {} buckets", intervals.len()),
            }
        })?;
        Ok(drill_down(snapshot, bucket, kind))
    }

    /// Drill into whichever primary bucket contains `at`.
    pub fn drill_down_at(
        &self,
        snapshot: &RecordSnapshot,
        request: &DashboardRequest,
        at: Timestamp,
        kind: DrillDownKind,
    ) -> AnalyticsResult<DrillDown> {
        request.validate()?;
        let index = self.intervals(&request.range).position_of(at).ok_or_else(|| {
            AnalyticsError::InvalidParameter {
                name: "at",
                reason: format!("{at} is outside {} to {}", request.range.from, request.range.to),
            }
        })?;
        self.drill_down(snapshot, request, index, kind)
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}
