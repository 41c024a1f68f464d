//! Point-in-time resolver tests.

use chrono::{NaiveDate, NaiveDateTime};
use coachdesk_core::{
    interval::Bucket,
    resolver::{active_at, active_at_bucket_start, active_through_bucket, current_members},
    types::{end_of_day, start_of_day, MembershipRecord, MembershipStatus, Tier},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn at(y: i32, m: u32, day: u32) -> NaiveDateTime {
    start_of_day(d(y, m, day))
}

fn membership(id: &str, start: NaiveDate, end: Option<NaiveDate>, status: MembershipStatus) -> MembershipRecord {
    MembershipRecord {
        id: id.into(),
        client_id: format!("client-{id}"),
        tier: Tier::Essential,
        program_type: None,
        status,
        monthly_price: Some(100.0),
        start_date: start,
        end_date: end,
        renewal_date: None,
    }
}

fn march() -> Bucket {
    Bucket { start: at(2024, 3, 1), end: end_of_day(d(2024, 3, 31)), label: "Mar 2024".into() }
}

fn ids(ms: &[&MembershipRecord]) -> Vec<String> {
    ms.iter().map(|m| m.id.clone()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn open_ended_membership_is_active_after_start() {
    let m = membership("a", d(2024, 1, 1), None, MembershipStatus::Active);
    let set = [m];
    assert_eq!(active_at(&set, at(2024, 1, 1)).len(), 1, "start instant is inclusive");
    assert_eq!(active_at(&set, at(2030, 6, 1)).len(), 1);
    assert!(active_at(&set, at(2023, 12, 31)).is_empty());
}

#[test]
fn membership_is_inactive_after_end_date() {
    let set = [membership("a", d(2024, 1, 1), Some(d(2024, 2, 10)), MembershipStatus::Cancelled)];
    assert_eq!(active_at(&set, at(2024, 2, 10)).len(), 1, "end date is inclusive");
    assert!(active_at(&set, at(2024, 2, 11)).is_empty());
}

/// Historical reconstruction ignores status entirely.
#[test]
fn status_does_not_affect_point_in_time_resolution() {
    let set = [
        membership("cancelled-no-end", d(2024, 1, 1), None, MembershipStatus::Cancelled),
        membership("active-with-end", d(2024, 1, 1), Some(d(2024, 1, 15)), MembershipStatus::Active),
    ];
    assert_eq!(ids(&active_at(&set, at(2024, 2, 1))), vec!["cancelled-no-end"]);
    assert_eq!(ids(&current_members(&set)), vec!["active-with-end"]);
}

/// The stock-metric and churn-denominator predicates disagree on members
/// that join or leave mid-bucket.
#[test]
fn bucket_predicates_are_distinct() {
    let set = [
        membership("before", d(2024, 1, 1), None, MembershipStatus::Active),
        membership("joins-mid", d(2024, 3, 15), None, MembershipStatus::Active),
        membership("leaves-mid", d(2024, 1, 1), Some(d(2024, 3, 10)), MembershipStatus::Cancelled),
        membership("left-earlier", d(2024, 1, 1), Some(d(2024, 2, 20)), MembershipStatus::Cancelled),
        membership("joins-later", d(2024, 4, 2), None, MembershipStatus::Active),
    ];

    let through = ids(&active_through_bucket(&set, &march()));
    assert_eq!(through, vec!["before", "joins-mid", "leaves-mid"]);

    let at_start = ids(&active_at_bucket_start(&set, &march()));
    assert_eq!(at_start, vec!["before", "leaves-mid"]);
}

#[test]
fn empty_set_resolves_to_nothing() {
    assert!(active_at(&[], at(2024, 1, 1)).is_empty());
    assert!(active_through_bucket(&[], &march()).is_empty());
}
