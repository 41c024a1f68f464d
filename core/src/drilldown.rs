//! Drill-down aggregator: the records behind one chart point.
//!
//! Every kind filters with the same predicate its chart uses (see
//! `activity` and `resolver`), so `total_amount` / `total_count` reconcile
//! exactly with the plotted value for the same bucket.
//!
//! Record lists are ordered most-recent-first by the relevant date, ties
//! broken by id, so exports are reproducible.

use crate::{
    activity::{clients_created_in, clients_through, purchases_in, revenue},
    interval::Bucket,
    mrr::mrr,
    repository::RecordSnapshot,
    resolver::active_through_bucket,
    types::{
        ClientRecord, MarketingStatus, MembershipRecord, PurchaseRecord, RevenueCategory,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DrillDownKind {
    NewClients,
    CumulativeClients,
    Revenue,
    /// Clients existing at bucket end with this funnel stage.
    MarketingStage(MarketingStatus),
    /// Purchases in the bucket that fall in this reporting category.
    PurchaseCategory(RevenueCategory),
    /// Memberships active through the bucket (the MRR chart point).
    ActiveMembers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum DrillDownRecords {
    Clients(Vec<ClientRecord>),
    Purchases(Vec<PurchaseRecord>),
    Memberships(Vec<MembershipRecord>),
}

impl DrillDownRecords {
    pub fn len(&self) -> usize {
        match self {
            Self::Clients(v)     => v.len(),
            Self::Purchases(v)   => v.len(),
            Self::Memberships(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub count:  usize,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillDown {
    pub kind:         DrillDownKind,
    pub bucket:       Bucket,
    pub records:      DrillDownRecords,
    pub total_count:  usize,
    /// Summed purchase amount or monthly price; 0 for client lists.
    pub total_amount: f64,
    /// Secondary dimension: marketing status, purchase type, or tier.
    pub breakdown:    BTreeMap<String, BreakdownEntry>,
}

pub fn drill_down(snapshot: &RecordSnapshot, bucket: &Bucket, kind: DrillDownKind) -> DrillDown {
    let (records, total_amount, breakdown) = match kind {
        DrillDownKind::NewClients => {
            client_result(clients_created_in(&snapshot.clients, bucket))
        }
        DrillDownKind::CumulativeClients => {
            client_result(clients_through(&snapshot.clients, bucket.end))
        }
        DrillDownKind::MarketingStage(stage) => client_result(
            clients_through(&snapshot.clients, bucket.end)
                .into_iter()
                .filter(|c| c.marketing_status == stage)
                .collect(),
        ),
        DrillDownKind::Revenue => purchase_result(purchases_in(&snapshot.purchases, bucket)),
        DrillDownKind::PurchaseCategory(category) => purchase_result(
            purchases_in(&snapshot.purchases, bucket)
                .into_iter()
                .filter(|p| p.category() == category)
                .collect(),
        ),
        DrillDownKind::ActiveMembers => {
            membership_result(active_through_bucket(&snapshot.memberships, bucket))
        }
    };

    log::debug!(
        "drill-down {:?} [{} → {}]: {} records",
        kind, bucket.start, bucket.end, records.len(),
    );

    DrillDown {
        kind,
        bucket: bucket.clone(),
        total_count: records.len(),
        records,
        total_amount,
        breakdown,
    }
}

type DrillParts = (DrillDownRecords, f64, BTreeMap<String, BreakdownEntry>);

fn client_result(mut clients: Vec<&ClientRecord>) -> DrillParts {
    clients.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut breakdown: BTreeMap<String, BreakdownEntry> = BTreeMap::new();
    for c in &clients {
        breakdown
            .entry(c.marketing_status.as_str().to_string())
            .or_default()
            .count += 1;
    }

    let records = clients.into_iter().cloned().collect();
    (DrillDownRecords::Clients(records), 0.0, breakdown)
}

fn purchase_result(mut purchases: Vec<&PurchaseRecord>) -> DrillParts {
    // Summed in chart order so the total is bit-identical to the plotted value.
    let total = revenue(&purchases);
    purchases.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at).then_with(|| a.id.cmp(&b.id)));

    let mut breakdown: BTreeMap<String, BreakdownEntry> = BTreeMap::new();
    for p in &purchases {
        let entry = breakdown.entry(p.purchase_type.as_str().to_string()).or_default();
        entry.count += 1;
        entry.amount += p.amount.max(0.0);
    }

    let records = purchases.into_iter().cloned().collect();
    (DrillDownRecords::Purchases(records), total, breakdown)
}

fn membership_result(mut memberships: Vec<&MembershipRecord>) -> DrillParts {
    let total = mrr(&memberships);
    memberships.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.id.cmp(&b.id)));

    let mut breakdown: BTreeMap<String, BreakdownEntry> = BTreeMap::new();
    for m in &memberships {
        let entry = breakdown.entry(m.tier.as_str().to_string()).or_default();
        entry.count += 1;
        entry.amount += m.price();
    }

    let records = memberships.into_iter().cloned().collect();
    (DrillDownRecords::Memberships(records), total, breakdown)
}
