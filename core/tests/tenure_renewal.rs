//! Tenure distribution and renewal tracking tests.

use chrono::NaiveDate;
use coachdesk_core::{
    config::RenewalConfig,
    renewal::summarize_renewals,
    tenure::{summarize_tenure, tenure_months, TenureBand},
    types::{MembershipRecord, MembershipStatus, Tier},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn today() -> NaiveDate {
    d(2024, 3, 20)
}

fn member(id: &str, start: NaiveDate, status: MembershipStatus) -> MembershipRecord {
    MembershipRecord {
        id: id.into(),
        client_id: format!("client-{id}"),
        tier: Tier::Essential,
        program_type: None,
        status,
        monthly_price: Some(100.0),
        start_date: start,
        end_date: None,
        renewal_date: None,
    }
}

fn renewing(id: &str, renewal: NaiveDate, price: f64, status: MembershipStatus) -> MembershipRecord {
    MembershipRecord {
        monthly_price: Some(price),
        renewal_date: Some(renewal),
        ..member(id, d(2023, 1, 1), status)
    }
}

fn renewal_config() -> RenewalConfig {
    RenewalConfig { upcoming_horizon_days: 30, lookback_days: 90 }
}

// ── Tenure ───────────────────────────────────────────────────────────────────

#[test]
fn tenure_counts_whole_calendar_months() {
    let m = member("a", d(2023, 3, 21), MembershipStatus::Active);
    assert_eq!(tenure_months(&m, today()), 11, "one day short of a year");
    let m = member("b", d(2023, 3, 20), MembershipStatus::Active);
    assert_eq!(tenure_months(&m, today()), 12);
}

#[test]
fn tenure_distribution_over_active_members() {
    let set = vec![
        member("a", d(2024, 1, 1), MembershipStatus::Active),
        member("b", d(2023, 9, 20), MembershipStatus::Active),
        member("c", d(2023, 3, 21), MembershipStatus::Active),
        member("d", d(2022, 1, 1), MembershipStatus::Active),
        member("gone", d(2020, 1, 1), MembershipStatus::Cancelled),
    ];

    let tenure = summarize_tenure(&set, today());
    assert_eq!(tenure.avg_tenure_months, 11.25);
    assert_eq!(tenure.longest_tenure_months, 26);

    let counts: Vec<(TenureBand, usize)> =
        tenure.distribution.iter().map(|b| (b.band, b.count)).collect();
    assert_eq!(
        counts,
        vec![
            (TenureBand::UnderThreeMonths, 1),
            (TenureBand::ThreeToSixMonths, 0),
            (TenureBand::SixToTwelveMonths, 2),
            (TenureBand::TwelvePlusMonths, 1),
        ]
    );
    assert_eq!(tenure.distribution[3].label, "12+ months");
}

#[test]
fn tenure_of_nobody_is_zero() {
    let tenure = summarize_tenure(&[], today());
    assert_eq!(tenure.avg_tenure_months, 0.0);
    assert_eq!(tenure.longest_tenure_months, 0);
    assert!(tenure.distribution.iter().all(|b| b.count == 0));
}

// ── Renewals ─────────────────────────────────────────────────────────────────

#[test]
fn upcoming_renewals_cover_horizon_inclusive() {
    let set = vec![
        renewing("late", d(2024, 4, 19), 50.0, MembershipStatus::Active),
        renewing("soon", d(2024, 3, 25), 100.0, MembershipStatus::Active),
        renewing("beyond", d(2024, 4, 20), 400.0, MembershipStatus::Active),
        renewing("past", d(2024, 3, 19), 400.0, MembershipStatus::Active),
    ];

    let summary = summarize_renewals(&set, today(), &renewal_config());
    assert_eq!(summary.upcoming_count, 2);
    assert_eq!(summary.mrr_at_risk, 150.0);
    let ids: Vec<&str> = summary.upcoming.iter().map(|u| u.membership_id.as_str()).collect();
    assert_eq!(ids, vec!["soon", "late"], "sorted by renewal date");
}

/// Success rate judges memberships renewed in the lookback window by their
/// current status.
#[test]
fn success_rate_uses_trailing_window() {
    let set = vec![
        renewing("kept", d(2024, 2, 1), 100.0, MembershipStatus::Active),
        renewing("lost", d(2024, 1, 15), 100.0, MembershipStatus::Cancelled),
        renewing("ancient", d(2023, 12, 1), 100.0, MembershipStatus::Cancelled),
    ];

    let summary = summarize_renewals(&set, today(), &renewal_config());
    assert_eq!(summary.recent_renewals, 2);
    assert_eq!(summary.renewed_count, 1);
    assert_eq!(summary.renewal_success_rate, 50.0);
    assert_eq!(summary.upcoming_count, 0);
}

#[test]
fn no_renewal_dates_yields_zero_rate() {
    let set = vec![member("a", d(2024, 1, 1), MembershipStatus::Active)];
    let summary = summarize_renewals(&set, today(), &renewal_config());
    assert_eq!(summary.recent_renewals, 0);
    assert_eq!(summary.renewal_success_rate, 0.0);
    assert_eq!(summary.mrr_at_risk, 0.0);
}
