//! Record repository seam.
//!
//! RULE: Aggregators never fetch. A pass starts by materializing a
//! `RecordSnapshot` from whatever repository backs the dashboard, and every
//! component reads from that snapshot only.

use crate::{
    error::AnalyticsResult,
    types::{ClientRecord, MembershipRecord, PurchaseRecord},
};
use serde::{Deserialize, Serialize};

pub trait RecordRepository {
    fn list_memberships(&self) -> AnalyticsResult<Vec<MembershipRecord>>;
    fn list_purchases(&self) -> AnalyticsResult<Vec<PurchaseRecord>>;
    fn list_clients(&self) -> AnalyticsResult<Vec<ClientRecord>>;
}

/// A fully materialized copy of all three record streams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub memberships: Vec<MembershipRecord>,
    pub purchases:   Vec<PurchaseRecord>,
    pub clients:     Vec<ClientRecord>,
}

impl RecordSnapshot {
    pub fn new(
        memberships: Vec<MembershipRecord>,
        purchases: Vec<PurchaseRecord>,
        clients: Vec<ClientRecord>,
    ) -> Self {
        Self { memberships, purchases, clients }
    }

    /// Read every stream from `repo`. Any fetch failure fails the whole load;
    /// callers surface that as "no data available".
    pub fn load<R: RecordRepository + ?Sized>(repo: &R) -> AnalyticsResult<Self> {
        let snapshot = Self {
            memberships: repo.list_memberships()?,
            purchases:   repo.list_purchases()?,
            clients:     repo.list_clients()?,
        };
        log::debug!(
            "snapshot loaded: {} memberships, {} purchases, {} clients",
            snapshot.memberships.len(),
            snapshot.purchases.len(),
            snapshot.clients.len(),
        );
        Ok(snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty() && self.purchases.is_empty() && self.clients.is_empty()
    }
}

impl RecordRepository for RecordSnapshot {
    fn list_memberships(&self) -> AnalyticsResult<Vec<MembershipRecord>> {
        Ok(self.memberships.clone())
    }

    fn list_purchases(&self) -> AnalyticsResult<Vec<PurchaseRecord>> {
        Ok(self.purchases.clone())
    }

    fn list_clients(&self) -> AnalyticsResult<Vec<ClientRecord>> {
        Ok(self.clients.clone())
    }
}
