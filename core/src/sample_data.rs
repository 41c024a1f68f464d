//! Deterministic sample record sets.
//!
//! Same seed and parameters → byte-identical snapshot. Used by the runner
//! when no database is given, and by tests that need realistic volume.

use crate::{
    interval::months_between,
    name_generator::NameGenerator,
    repository::RecordSnapshot,
    rng::{SampleRng, StreamSlot},
    types::{
        start_of_day, ClientRecord, MarketingStatus, MembershipRecord, MembershipStatus,
        ProgramType, PurchaseRecord, PurchaseType, Tier,
    },
};
use chrono::{Days, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleParams {
    pub clients:         usize,
    pub history_months:  u32,
    pub today:           NaiveDate,
    /// Probability that a client ever holds a membership.
    pub membership_rate: f64,
    /// Probability that a membership has since been cancelled or expired.
    pub churn_rate:      f64,
}

impl SampleParams {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            clients:         200,
            history_months:  18,
            today,
            membership_rate: 0.7,
            churn_rate:      0.3,
        }
    }
}

const TIER_WEIGHTS: [f64; 4] = [0.15, 0.40, 0.30, 0.15];
const PROGRAM_WEIGHTS: [f64; 4] = [0.40, 0.25, 0.20, 0.15];
/// Share of memberships stored without a program type.
const UNTYPED_PROGRAM_RATE: f64 = 0.1;

fn tier_price(tier: Tier) -> Option<f64> {
    match tier {
        Tier::Free      => None,
        Tier::Essential => Some(99.0),
        Tier::Premium   => Some(199.0),
        Tier::Elite     => Some(399.0),
    }
}

pub struct SampleDataGenerator;

impl SampleDataGenerator {
    pub fn generate(seed: u64, params: &SampleParams) -> RecordSnapshot {
        let mut client_rng = SampleRng::new(seed, StreamSlot::Client);
        let mut membership_rng = SampleRng::new(seed, StreamSlot::Membership);
        let mut purchase_rng = SampleRng::new(seed, StreamSlot::Purchase);

        let history_start = params.today - Months::new(params.history_months);
        let history_days = (params.today - history_start).num_days().max(1) as u64;

        let mut clients = Vec::with_capacity(params.clients);
        let mut memberships = Vec::new();
        let mut purchases = Vec::new();

        for _ in 0..params.clients {
            let created = history_start + Days::new(client_rng.next_u64_below(history_days));
            let full_name = NameGenerator::full_name(&mut client_rng);
            let email = NameGenerator::email_for(&full_name, &mut client_rng);
            let client_id = client_rng.uuid().to_string();
            let created_at = start_of_day(created)
                + Duration::minutes(client_rng.next_u64_below(24 * 60) as i64);

            let membership = if membership_rng.chance(params.membership_rate) {
                Some(Self::membership_for(&client_id, created, params, &mut membership_rng))
            } else {
                None
            };

            let marketing_status = match &membership {
                Some(m) if m.status.is_churned() => MarketingStatus::Churned,
                Some(m) if m.tier == Tier::Elite => MarketingStatus::Vip,
                Some(_) => MarketingStatus::Customer,
                None if client_rng.chance(0.5) => MarketingStatus::Lead,
                None => MarketingStatus::Prospect,
            };

            if let Some(m) = &membership {
                Self::subscription_payments(m, params.today, &mut purchase_rng, &mut purchases);
            }
            Self::ancillary_purchases(&client_id, created, params.today, &mut purchase_rng, &mut purchases);

            clients.push(ClientRecord {
                id: client_id,
                full_name,
                email,
                created_at,
                marketing_status,
            });
            memberships.extend(membership);
        }

        log::debug!(
            "sample data (seed={seed}): {} clients, {} memberships, {} purchases",
            clients.len(), memberships.len(), purchases.len(),
        );

        RecordSnapshot::new(memberships, purchases, clients)
    }

    fn membership_for(
        client_id: &str,
        created: NaiveDate,
        params: &SampleParams,
        rng: &mut SampleRng,
    ) -> MembershipRecord {
        let tier = Tier::ALL[rng.weighted_index(&TIER_WEIGHTS)];
        let program_type = if rng.chance(UNTYPED_PROGRAM_RATE) {
            None
        } else {
            Some(ProgramType::ALL[rng.weighted_index(&PROGRAM_WEIGHTS)])
        };

        let remaining = (params.today - created).num_days().max(1) as u64;
        let start_date = created + Days::new(rng.next_u64_below(remaining.min(30)));

        let churned = rng.chance(params.churn_rate) && start_date < params.today;
        let (status, end_date) = if churned {
            let lived = (params.today - start_date).num_days().max(1) as u64;
            let end = start_date + Days::new(1 + rng.next_u64_below(lived));
            let status = if rng.chance(0.8) {
                MembershipStatus::Cancelled
            } else {
                MembershipStatus::Expired
            };
            (status, Some(end.min(params.today)))
        } else if rng.chance(0.05) {
            (MembershipStatus::Paused, None)
        } else {
            (MembershipStatus::Active, None)
        };

        // Monthly anniversary on or after today for live memberships, the
        // last anniversary before leaving for churned ones.
        let anchor = end_date.unwrap_or(params.today);
        let elapsed = months_between(anchor, start_date);
        let mut renewal = start_date + Months::new(elapsed);
        if end_date.is_none() && renewal < params.today {
            renewal = renewal + Months::new(1);
        }

        MembershipRecord {
            id: rng.uuid().to_string(),
            client_id: client_id.to_string(),
            tier,
            program_type,
            status,
            monthly_price: tier_price(tier),
            start_date,
            end_date,
            renewal_date: Some(renewal),
        }
    }

    fn subscription_payments(
        m: &MembershipRecord,
        today: NaiveDate,
        rng: &mut SampleRng,
        out: &mut Vec<PurchaseRecord>,
    ) {
        let price = m.price();
        if price <= 0.0 {
            return;
        }
        let last = m.end_date.unwrap_or(today).min(today);
        let mut due = m.start_date;
        let mut n = 0;
        while due <= last {
            out.push(PurchaseRecord {
                id: rng.uuid().to_string(),
                client_id: m.client_id.clone(),
                purchase_type: PurchaseType::Subscription,
                amount: price,
                purchased_at: start_of_day(due) + Duration::hours(9),
            });
            n += 1;
            due = m.start_date + Months::new(n);
        }
    }

    fn ancillary_purchases(
        client_id: &str,
        created: NaiveDate,
        today: NaiveDate,
        rng: &mut SampleRng,
        out: &mut Vec<PurchaseRecord>,
    ) {
        const KINDS: [(PurchaseType, f64, f64, f64); 4] = [
            (PurchaseType::Supplement, 0.50, 25.0, 120.0),
            (PurchaseType::LabTesting, 0.20, 150.0, 450.0),
            (PurchaseType::Service,    0.25, 80.0, 300.0),
            (PurchaseType::OneTime,    0.10, 20.0, 90.0),
        ];

        let span = (today - created).num_days().max(1) as u64;
        for (kind, probability, lo, hi) in KINDS {
            let count = (0..3).filter(|_| rng.chance(probability)).count();
            for _ in 0..count {
                let day = created + Days::new(rng.next_u64_below(span));
                let amount = (rng.range_f64(lo, hi) * 100.0).round() / 100.0;
                out.push(PurchaseRecord {
                    id: rng.uuid().to_string(),
                    client_id: client_id.to_string(),
                    purchase_type: kind,
                    amount,
                    purchased_at: start_of_day(day)
                        + Duration::minutes(rng.next_u64_below(24 * 60) as i64),
                });
            }
        }
    }
}
