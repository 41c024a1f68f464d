//! RecordStore integration tests (in-memory SQLite).

use chrono::NaiveDate;
use coachdesk_core::{
    engine::{AnalyticsEngine, DashboardRequest},
    interval::DateRange,
    repository::{RecordRepository, RecordSnapshot},
    sample_data::{SampleDataGenerator, SampleParams},
    store::{RawMembership, RecordStore},
    types::{start_of_day, MembershipStatus, ProgramType, PurchaseType, Tier},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn store() -> RecordStore {
    // Surfaces the skipped-row warnings under `cargo test -- --nocapture`.
    let _ = env_logger::builder().is_test(true).try_init();
    let s = RecordStore::in_memory().unwrap();
    s.migrate().unwrap();
    s
}

fn raw<'a>(id: &'a str) -> RawMembership<'a> {
    RawMembership {
        id,
        client_id: "client-1",
        tier: "premium",
        status: "active",
        monthly_price: Some("200"),
        start_date: "2024-01-01",
        ..RawMembership::default()
    }
}

fn sorted(mut snap: RecordSnapshot) -> RecordSnapshot {
    snap.memberships.sort_by(|a, b| a.id.cmp(&b.id));
    snap.purchases.sort_by(|a, b| a.id.cmp(&b.id));
    snap.clients.sort_by(|a, b| a.id.cmp(&b.id));
    snap
}

fn populated(snapshot: &RecordSnapshot) -> RecordStore {
    let mut s = store();
    s.in_transaction(|tx| {
        for c in &snapshot.clients {
            tx.insert_client(c)?;
        }
        for m in &snapshot.memberships {
            tx.insert_membership(m)?;
        }
        for p in &snapshot.purchases {
            tx.insert_purchase(p)?;
        }
        Ok(())
    })
    .unwrap();
    s
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn migrate_is_idempotent() {
    let s = store();
    s.migrate().unwrap();
    assert_eq!(s.membership_count().unwrap(), 0);
    assert_eq!(s.client_count().unwrap(), 0);
}

#[test]
fn snapshot_round_trips_through_sqlite() {
    let original = SampleDataGenerator::generate(13, &SampleParams::new(d(2024, 6, 30)));
    let s = populated(&original);

    assert_eq!(s.client_count().unwrap(), original.clients.len() as i64);
    let loaded = RecordSnapshot::load(&s).unwrap();
    assert_eq!(loaded, sorted(original));
}

/// A pass over the store and a pass over the same data in memory agree.
#[test]
fn load_and_compute_matches_in_memory_pass() {
    let original = sorted(SampleDataGenerator::generate(14, &SampleParams::new(d(2024, 6, 30))));
    let s = populated(&original);

    let engine = AnalyticsEngine::default();
    let req = DashboardRequest::new(
        DateRange::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap(),
        start_of_day(d(2024, 6, 30)),
    );
    let from_store = engine.load_and_compute(&s, &req).unwrap();
    let in_memory = engine.compute(&original, &req).unwrap();
    assert_eq!(from_store, in_memory);

    let dyn_repo: &dyn RecordRepository = &s;
    assert!(engine.load_and_compute(dyn_repo, &req).is_ok());
}

#[test]
fn malformed_rows_are_skipped() {
    let s = store();
    s.insert_membership_raw(&raw("good")).unwrap();
    s.insert_membership_raw(&RawMembership { start_date: "01/02/2024", ..raw("bad-date") }).unwrap();
    s.insert_membership_raw(&RawMembership { tier: "platinum", ..raw("bad-tier") }).unwrap();
    s.insert_membership_raw(&RawMembership { end_date: Some("soon"), ..raw("bad-end") }).unwrap();
    s.insert_purchase_raw("p-good", "client-1", "supplement", "40", "2024-02-01 10:00:00").unwrap();
    s.insert_purchase_raw("p-kind", "client-1", "gift_card", "40", "2024-02-01 10:00:00").unwrap();
    s.insert_purchase_raw("p-when", "client-1", "supplement", "40", "last tuesday").unwrap();
    s.insert_purchase_raw("p-amount", "client-1", "supplement", "n/a", "2024-02-01 10:00:00").unwrap();
    s.insert_membership_raw(&RawMembership { monthly_price: Some("$200"), ..raw("bad-price") }).unwrap();

    assert_eq!(s.membership_count().unwrap(), 5);
    let memberships = s.list_memberships().unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].id, "good");
    assert_eq!(memberships[0].monthly_price, Some(200.0));

    let purchases = s.list_purchases().unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].id, "p-good");
    assert_eq!(purchases[0].purchase_type, PurchaseType::Supplement);
    assert_eq!(purchases[0].amount, 40.0);
}

#[test]
fn lenient_columns_decode_to_defaults() {
    let s = store();
    s.insert_membership_raw(&RawMembership { program_type: Some("yoga"), ..raw("unknown-program") }).unwrap();
    s.insert_membership_raw(&RawMembership {
        tier: "free",
        monthly_price: None,
        status: "expired",
        end_date: Some("2024-02-01T00:00:00"),
        ..raw("free")
    })
    .unwrap();
    s.insert_membership_raw(&RawMembership { program_type: Some("sleep"), end_date: Some(""), ..raw("sleep") })
        .unwrap();

    let memberships = s.list_memberships().unwrap();
    assert_eq!(memberships.len(), 3);

    let free = &memberships[0];
    assert_eq!(free.tier, Tier::Free);
    assert_eq!(free.monthly_price, None);
    assert_eq!(free.price(), 0.0);
    assert_eq!(free.status, MembershipStatus::Expired);
    assert_eq!(free.end_date, Some(d(2024, 2, 1)));

    let sleep = &memberships[1];
    assert_eq!(sleep.program_type, Some(ProgramType::Sleep));
    assert_eq!(sleep.end_date, None);

    let unknown = &memberships[2];
    assert_eq!(unknown.program_type, None);
    assert_eq!(unknown.program(), ProgramType::Wellness);
}

#[test]
fn failed_transaction_rolls_back() {
    let original = SampleDataGenerator::generate(2, &SampleParams::new(d(2024, 6, 30)));
    let mut s = store();
    let result = s.in_transaction(|tx| {
        tx.insert_client(&original.clients[0])?;
        tx.insert_client(&original.clients[0])
    });
    assert!(result.is_err());
    assert_eq!(s.client_count().unwrap(), 0);
}
