//! Churn aggregator tests.

use chrono::{NaiveDate, NaiveDateTime};
use coachdesk_core::{
    churn::{churn_by_segment, churn_trend, summarize_churn},
    config::{ChurnConfig, IntervalConfig},
    interval::{generate_intervals, DateRange},
    sample_data::{SampleDataGenerator, SampleParams},
    types::{start_of_day, MembershipRecord, MembershipStatus, ProgramType, Tier},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn now() -> NaiveDateTime {
    start_of_day(d(2024, 3, 20))
}

fn window() -> ChurnConfig {
    ChurnConfig { window_days: 30 }
}

fn membership(
    id: &str,
    tier: Tier,
    price: f64,
    start: NaiveDate,
    end: Option<NaiveDate>,
    status: MembershipStatus,
) -> MembershipRecord {
    MembershipRecord {
        id: id.into(),
        client_id: format!("client-{id}"),
        tier,
        program_type: None,
        status,
        monthly_price: Some(price),
        start_date: start,
        end_date: end,
        renewal_date: None,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// One active premium member and one essential member cancelled five days
/// ago: churn is 1 / (1 + 1) = 50%.
#[test]
fn reference_scenario_yields_fifty_percent() {
    let set = vec![
        membership("p", Tier::Premium, 200.0, d(2024, 1, 1), None, MembershipStatus::Active),
        membership("e", Tier::Essential, 100.0, d(2024, 1, 1), Some(d(2024, 3, 15)), MembershipStatus::Cancelled),
    ];

    let churn = summarize_churn(&set, now(), &window());
    assert_eq!(churn.recent_cancellations, 1);
    assert_eq!(churn.active_now, 1);
    assert_eq!(churn.monthly_churn_rate, 50.0);
    assert_eq!(churn.lost_mrr, 100.0);
    assert_eq!(churn.total_churned, 1);
    assert_eq!(churn.lifetime_churn_rate, 50.0);
}

/// The window start belongs to the recent window, not the previous one.
#[test]
fn window_boundaries_are_half_open_for_previous() {
    let set = vec![
        membership("edge", Tier::Essential, 100.0, d(2023, 6, 1), Some(d(2024, 2, 19)), MembershipStatus::Cancelled),
        membership("prev", Tier::Essential, 100.0, d(2023, 6, 1), Some(d(2024, 2, 1)), MembershipStatus::Cancelled),
        membership("old", Tier::Essential, 100.0, d(2023, 6, 1), Some(d(2024, 1, 19)), MembershipStatus::Cancelled),
        membership("exp", Tier::Essential, 100.0, d(2023, 6, 1), Some(d(2024, 3, 1)), MembershipStatus::Expired),
    ];

    let churn = summarize_churn(&set, now(), &window());
    assert_eq!(churn.recent_cancellations, 1, "2024-02-19 is exactly now - 30d");
    assert_eq!(churn.previous_cancellations, 1);
    assert_eq!(churn.cancellation_delta, 0);
    assert_eq!(churn.total_churned, 4, "expired counts toward lifetime churn");
    assert_eq!(churn.active_now, 0);
    assert_eq!(churn.monthly_churn_rate, 100.0);
}

#[test]
fn empty_set_yields_zero_rates() {
    let churn = summarize_churn(&[], now(), &window());
    assert_eq!(churn.monthly_churn_rate, 0.0);
    assert_eq!(churn.lifetime_churn_rate, 0.0);
    assert_eq!(churn.lost_mrr, 0.0);
}

/// Per-bucket churn divides by members active at the bucket's first
/// instant, so a member who joined and left inside the bucket raises the
/// numerator but not the denominator.
#[test]
fn trend_uses_bucket_start_population() {
    let set = vec![
        membership("stayer", Tier::Premium, 200.0, d(2024, 1, 1), None, MembershipStatus::Active),
        membership("flash", Tier::Essential, 100.0, d(2024, 3, 10), Some(d(2024, 3, 20)), MembershipStatus::Cancelled),
    ];
    let range = DateRange::new(d(2024, 1, 1), d(2024, 4, 30)).unwrap();
    let intervals = generate_intervals(&range, &IntervalConfig { daily_max_span_days: 14, weekly_max_span_days: 90 });

    let trend = churn_trend(&set, &intervals);
    let march = trend.iter().find(|p| p.label == "Mar 2024").unwrap();
    assert_eq!(march.cancellations, 1);
    assert_eq!(march.active_at_start, 1);
    assert_eq!(march.rate, 100.0);

    let jan = trend.iter().find(|p| p.label == "Jan 2024").unwrap();
    assert_eq!(jan.active_at_start, 1);
    assert_eq!(jan.rate, 0.0);
}

#[test]
fn zero_population_bucket_has_zero_rate() {
    let set = vec![membership("x", Tier::Free, 0.0, d(2024, 5, 10), Some(d(2024, 5, 12)), MembershipStatus::Cancelled)];
    let range = DateRange::new(d(2024, 5, 1), d(2024, 5, 14)).unwrap();
    let intervals = generate_intervals(&range, &IntervalConfig { daily_max_span_days: 14, weekly_max_span_days: 90 });
    for point in churn_trend(&set, &intervals) {
        assert!(point.rate.is_finite());
        if point.active_at_start == 0 {
            assert_eq!(point.rate, 0.0);
        }
    }
}

/// Cancellation counts, active counts and lost MRR are additive across tiers
/// and program types.
#[test]
fn segmented_counts_sum_to_total() {
    let snapshot = SampleDataGenerator::generate(11, &SampleParams::new(d(2024, 3, 20)));
    let set = &snapshot.memberships;
    let total = summarize_churn(set, now(), &window());

    let tiers = churn_by_segment::<Tier>(set, now(), &window());
    assert_eq!(tiers.values().map(|c| c.recent_cancellations).sum::<usize>(), total.recent_cancellations);
    assert_eq!(tiers.values().map(|c| c.active_now).sum::<usize>(), total.active_now);
    assert_eq!(tiers.values().map(|c| c.total_churned).sum::<usize>(), total.total_churned);
    let lost: f64 = tiers.values().map(|c| c.lost_mrr).sum();
    assert!((lost - total.lost_mrr).abs() < 1e-6);

    let programs = churn_by_segment::<ProgramType>(set, now(), &window());
    assert_eq!(programs.values().map(|c| c.recent_cancellations).sum::<usize>(), total.recent_cancellations);
    assert_eq!(programs.values().map(|c| c.active_now).sum::<usize>(), total.active_now);
}
