//! Forecast engine tests.

use chrono::{Duration, NaiveDate};
use coachdesk_core::{
    config::{AnalyticsConfig, ForecastConfig},
    forecast::{forecast_revenue, growth_rate, monthly_history},
    types::{start_of_day, PurchaseRecord, PurchaseType, RevenueCategory},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn config() -> ForecastConfig {
    AnalyticsConfig::default().forecast
}

fn purchase(id: &str, kind: PurchaseType, day: NaiveDate, amount: f64) -> PurchaseRecord {
    PurchaseRecord {
        id: id.into(),
        client_id: "client".into(),
        purchase_type: kind,
        amount,
        purchased_at: start_of_day(day) + Duration::hours(10),
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── Growth rate ──────────────────────────────────────────────────────────────

#[test]
fn flat_series_has_zero_growth() {
    assert_eq!(growth_rate(&[500.0; 6], &config()), 0.0);
}

#[test]
fn sparse_series_falls_back_to_default() {
    assert_eq!(growth_rate(&[0.0, 0.0, 0.0, 0.0, 0.0, 700.0], &config()), 0.02);
    assert_eq!(growth_rate(&[], &config()), 0.02);
}

/// Earlier half [100, 110], later half [120, 130, 140]:
/// (130 - 105) / 105 / 2.5.
#[test]
fn odd_length_series_gives_later_half_the_extra_month() {
    let rate = growth_rate(&[100.0, 110.0, 120.0, 130.0, 140.0], &config());
    assert!(close(rate, 25.0 / 105.0 / 2.5), "got {rate}");
}

#[test]
fn growth_is_clamped() {
    assert_eq!(growth_rate(&[10.0, 10.0, 1000.0, 1000.0], &config()), 0.20);
    assert_eq!(growth_rate(&[1000.0, 1000.0, 10.0, 10.0], &config()), -0.10);
}

/// Zero months are dropped before halving, so gaps do not read as collapse.
#[test]
fn zero_months_are_ignored() {
    assert_eq!(growth_rate(&[200.0, 0.0, 200.0, 0.0, 200.0, 200.0], &config()), 0.0);
}

// ── History ──────────────────────────────────────────────────────────────────

#[test]
fn history_spans_trailing_months_including_current() {
    let purchases = vec![
        purchase("in", PurchaseType::Supplement, d(2024, 6, 2), 40.0),
        purchase("first", PurchaseType::LabTesting, d(2023, 7, 1), 200.0),
        purchase("too_old", PurchaseType::LabTesting, d(2023, 6, 30), 999.0),
        purchase("future", PurchaseType::Supplement, d(2024, 7, 1), 999.0),
        purchase("misc", PurchaseType::OneTime, d(2024, 6, 3), 15.0),
    ];

    let history = monthly_history(&purchases, d(2024, 6, 15), 12);
    assert_eq!(history.len(), 12);
    assert_eq!(history[0].month, d(2023, 7, 1));
    assert_eq!(history[11].month, d(2024, 6, 1));
    assert_eq!(history[11].label, "Jun 2024");

    assert_eq!(history[0].amounts.lab_testing, 200.0);
    assert_eq!(history[11].amounts.supplement, 40.0);
    assert_eq!(history[11].amounts.get(RevenueCategory::Service), 15.0, "one-time counts as service");
    let all: f64 = history.iter().map(|h| h.total).sum();
    assert_eq!(all, 255.0);
}

// ── Projection ───────────────────────────────────────────────────────────────

#[test]
fn empty_history_projects_from_current_mrr() {
    let forecast = forecast_revenue(&[], 1000.0, d(2024, 6, 15), &config());

    assert_eq!(forecast.periods.len(), 6);
    assert_eq!(forecast.base.membership, 1000.0);
    assert!(close(forecast.periods[0].amounts.membership, 1020.0));
    assert_eq!(forecast.periods[0].amounts.supplement, 0.0);
    assert_eq!(forecast.periods[0].month, d(2024, 7, 1));
    assert_eq!(forecast.periods[0].label, "Jul 2024");
    assert!(forecast.periods.iter().all(|p| !p.re_anchored));
}

/// Membership revenue collapsing 1000 → 100 clamps growth to -10%. The first
/// projected month (90) falls below half of current MRR and is re-anchored
/// to 1000 × (1 − 0.1 × 1) = 900; the next compounds from there.
#[test]
fn collapsing_membership_line_is_re_anchored() {
    let amounts = [1000.0, 800.0, 600.0, 400.0, 200.0, 100.0];
    let purchases: Vec<PurchaseRecord> = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            purchase(&format!("m{i}"), PurchaseType::Subscription, d(2024, i as u32 + 1, 5), *amount)
        })
        .collect();

    let forecast = forecast_revenue(&purchases, 1000.0, d(2024, 6, 15), &config());
    assert_eq!(forecast.growth_rates.membership, -0.10);
    assert_eq!(forecast.base.membership, 100.0);

    let p1 = &forecast.periods[0];
    assert!(p1.re_anchored);
    assert!(close(p1.amounts.membership, 900.0));

    let p2 = &forecast.periods[1];
    assert!(!p2.re_anchored);
    assert!(close(p2.amounts.membership, 810.0));
}

#[test]
fn no_re_anchor_without_current_mrr() {
    let purchases = vec![
        purchase("a", PurchaseType::Subscription, d(2024, 5, 1), 400.0),
        purchase("b", PurchaseType::Subscription, d(2024, 6, 1), 100.0),
    ];
    let forecast = forecast_revenue(&purchases, 0.0, d(2024, 6, 15), &config());
    assert!(forecast.periods.iter().all(|p| !p.re_anchored));
    assert!(forecast.periods.iter().all(|p| p.amounts.membership >= 0.0));
}

#[test]
fn summary_totals_add_up() {
    let purchases = vec![
        purchase("s1", PurchaseType::Supplement, d(2024, 5, 1), 100.0),
        purchase("s2", PurchaseType::Supplement, d(2024, 6, 1), 120.0),
        purchase("v1", PurchaseType::Service, d(2024, 6, 2), 300.0),
    ];
    let forecast = forecast_revenue(&purchases, 500.0, d(2024, 6, 15), &config());

    let by_period: f64 = forecast.periods.iter().map(|p| p.total).sum();
    assert!(close(forecast.summary.total_forecast, by_period));
    assert!(close(forecast.summary.category_totals.total(), by_period));
    assert_eq!(forecast.summary.end_of_horizon_total, forecast.periods[5].total);
    for p in &forecast.periods {
        assert!(close(p.total, p.amounts.total()));
    }
}
