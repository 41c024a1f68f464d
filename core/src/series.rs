//! Labeled per-bucket series handed to the presentation layer.

use crate::{
    interval::{Bucket, IntervalSet},
    types::Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub start: Timestamp,
    pub end:   Timestamp,
    pub value: f64,
}

/// Evaluate `f` once per bucket, in bucket order.
pub fn series_over<F>(intervals: &IntervalSet, mut f: F) -> Vec<SeriesPoint>
where
    F: FnMut(&Bucket) -> f64,
{
    intervals
        .buckets
        .iter()
        .map(|b| SeriesPoint {
            label: b.label.clone(),
            start: b.start,
            end:   b.end,
            value: f(b),
        })
        .collect()
}
