//! Client and purchase activity: the bucket predicates behind the revenue,
//! client-growth and funnel charts.
//!
//! Drill-downs reuse these exact predicates, so a chart point and its
//! drill-down always agree.

use crate::{
    interval::{Bucket, IntervalSet},
    series::{series_over, SeriesPoint},
    types::{ClientRecord, MarketingStatus, PurchaseRecord, RevenueCategory, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn purchases_in<'a>(purchases: &'a [PurchaseRecord], bucket: &Bucket) -> Vec<&'a PurchaseRecord> {
    purchases.iter().filter(|p| bucket.contains(p.purchased_at)).collect()
}

pub fn clients_created_in<'a>(clients: &'a [ClientRecord], bucket: &Bucket) -> Vec<&'a ClientRecord> {
    clients.iter().filter(|c| bucket.contains(c.created_at)).collect()
}

/// Clients created on or before `as_of`.
pub fn clients_through(clients: &[ClientRecord], as_of: Timestamp) -> Vec<&ClientRecord> {
    clients.iter().filter(|c| c.created_at <= as_of).collect()
}

pub fn revenue(purchases: &[&PurchaseRecord]) -> f64 {
    purchases.iter().map(|p| p.amount.max(0.0)).sum()
}

pub fn revenue_series(purchases: &[PurchaseRecord], intervals: &IntervalSet) -> Vec<SeriesPoint> {
    series_over(intervals, |b| revenue(&purchases_in(purchases, b)))
}

/// One series per reporting category. Values at each index sum to `revenue_series`.
pub fn revenue_series_by_category(
    purchases: &[PurchaseRecord],
    intervals: &IntervalSet,
) -> BTreeMap<RevenueCategory, Vec<SeriesPoint>> {
    RevenueCategory::ALL
        .iter()
        .map(|cat| {
            let series = series_over(intervals, |b| {
                let hits: Vec<&PurchaseRecord> = purchases_in(purchases, b)
                    .into_iter()
                    .filter(|p| p.category() == *cat)
                    .collect();
                revenue(&hits)
            });
            (*cat, series)
        })
        .collect()
}

pub fn new_client_series(clients: &[ClientRecord], intervals: &IntervalSet) -> Vec<SeriesPoint> {
    series_over(intervals, |b| clients_created_in(clients, b).len() as f64)
}

pub fn cumulative_client_series(clients: &[ClientRecord], intervals: &IntervalSet) -> Vec<SeriesPoint> {
    series_over(intervals, |b| clients_through(clients, b.end).len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub status: MarketingStatus,
    pub count:  usize,
}

/// Client counts by marketing status, for clients that existed at `as_of`.
pub fn marketing_funnel(clients: &[ClientRecord], as_of: Timestamp) -> Vec<FunnelStage> {
    let known = clients_through(clients, as_of);
    MarketingStatus::ALL
        .iter()
        .map(|status| FunnelStage {
            status: *status,
            count:  known.iter().filter(|c| c.marketing_status == *status).count(),
        })
        .collect()
}
