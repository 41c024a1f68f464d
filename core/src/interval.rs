//! Interval generator: splits a date range into chart buckets.
//!
//! Granularity is chosen from the whole-day span of the range:
//!   span <= daily threshold   → one bucket per day
//!   span <= weekly threshold  → 7-day buckets anchored at `from`
//!   otherwise                 → calendar months
//!
//! Primary and comparison ranges are bucketed independently, so two
//! ranges with different spans may legitimately get different granularities.

use crate::{
    config::IntervalConfig,
    error::{AnalyticsError, AnalyticsResult},
    types::{end_of_day, start_of_day, Timestamp},
};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

// ── DateRange ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to:   NaiveDate,
}

impl DateRange {
    /// Rejects inverted ranges and dates outside `SUPPORTED_YEARS`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> AnalyticsResult<Self> {
        if from > to || !is_supported(from) || !is_supported(to) {
            return Err(AnalyticsError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Whole days between `from` and `to`.
    pub fn span_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }

    /// 00:00:00 on `from`.
    pub fn start(&self) -> Timestamp {
        start_of_day(self.from)
    }

    /// 23:59:59.999 on `to`.
    pub fn end(&self) -> Timestamp {
        end_of_day(self.to)
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start() && ts <= self.end()
    }

    /// The span of equal length ending the day before `from`.
    pub fn preceding(&self) -> AnalyticsResult<Self> {
        let span = Days::new(self.span_days().max(0) as u64);
        let shifted = self
            .from
            .pred_opt()
            .and_then(|to| to.checked_sub_days(span).map(|from| (from, to)));
        match shifted {
            Some((from, to)) => Self::new(from, to),
            None => Err(AnalyticsError::InvalidRange { from: self.from, to: self.to }),
        }
    }

    /// The same span shifted back one calendar year.
    /// Feb 29 clamps to Feb 28.
    pub fn year_earlier(&self) -> AnalyticsResult<Self> {
        let shift = |d: NaiveDate| d.checked_sub_months(Months::new(12));
        match (shift(self.from), shift(self.to)) {
            (Some(from), Some(to)) => Self::new(from, to),
            _ => Err(AnalyticsError::InvalidRange { from: self.from, to: self.to }),
        }
    }
}

/// Calendar years a request may address. Comparison shifts, churn lookbacks
/// and forecast months derived from such dates stay inside chrono's limits.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

pub fn is_supported(date: NaiveDate) -> bool {
    SUPPORTED_YEARS.contains(&date.year())
}

// ── Buckets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn for_span(span_days: i64, config: &IntervalConfig) -> Self {
        if span_days <= config.daily_max_span_days {
            Self::Day
        } else if span_days <= config.weekly_max_span_days {
            Self::Week
        } else {
            Self::Month
        }
    }

    fn label(&self, date: NaiveDate) -> String {
        match self {
            Self::Day | Self::Week => date.format("%b %-d").to_string(),
            Self::Month            => date.format("%b %Y").to_string(),
        }
    }
}

/// One chart bucket. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub start: Timestamp,
    pub end:   Timestamp,
    pub label: String,
}

impl Bucket {
    fn spanning(first_day: NaiveDate, last_day: NaiveDate, granularity: Granularity) -> Self {
        Self {
            start: start_of_day(first_day),
            end:   end_of_day(last_day),
            label: granularity.label(first_day),
        }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts <= self.end
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSet {
    pub granularity: Granularity,
    pub range:       DateRange,
    pub buckets:     Vec<Bucket>,
}

impl IntervalSet {
    /// The bucket a date falls into under this set's granularity.
    /// Dates outside the generated range still map to a well-formed bucket.
    pub fn bucket_of(&self, date: NaiveDate) -> Bucket {
        match self.granularity {
            Granularity::Day => Bucket::spanning(date, date, Granularity::Day),
            Granularity::Week => {
                let offset = (date - self.range.from).num_days().div_euclid(7) * 7;
                let first = shift_days(self.range.from, offset).unwrap_or(date);
                Bucket::spanning(first, week_end(first), Granularity::Week)
            }
            Granularity::Month => {
                let first = first_of_month(date);
                Bucket::spanning(first, last_of_month(first), Granularity::Month)
            }
        }
    }

    /// Index of the generated bucket containing `ts`, if any.
    pub fn position_of(&self, ts: Timestamp) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(ts))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Generate the ordered, non-overlapping buckets covering `range`.
pub fn generate_intervals(range: &DateRange, config: &IntervalConfig) -> IntervalSet {
    let granularity = Granularity::for_span(range.span_days(), config);
    let mut buckets = Vec::new();

    match granularity {
        Granularity::Day => {
            let mut day = Some(range.from);
            while let Some(d) = day.filter(|d| *d <= range.to) {
                buckets.push(Bucket::spanning(d, d, granularity));
                day = d.succ_opt();
            }
        }
        Granularity::Week => {
            let mut first = Some(range.from);
            while let Some(f) = first.filter(|f| *f <= range.to) {
                buckets.push(Bucket::spanning(f, week_end(f), granularity));
                first = f.checked_add_days(Days::new(7));
            }
        }
        Granularity::Month => {
            let last = first_of_month(range.to);
            let mut first = Some(first_of_month(range.from));
            while let Some(f) = first.filter(|f| *f <= last) {
                buckets.push(Bucket::spanning(f, last_of_month(f), granularity));
                first = f.checked_add_months(Months::new(1));
            }
        }
    }

    log::debug!(
        "intervals: {} → {} as {:?} ({} buckets)",
        range.from, range.to, granularity, buckets.len(),
    );

    IntervalSet { granularity, range: *range, buckets }
}

// ── Calendar arithmetic ──────────────────────────────────────────────────────

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Last day of the 7-day bucket starting at `first`.
fn week_end(first: NaiveDate) -> NaiveDate {
    first.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX)
}

/// Whole calendar months from `earlier` to `later`, counting a month only
/// once its day-of-month has been reached. Negative spans yield 0.
pub fn months_between(later: NaiveDate, earlier: NaiveDate) -> u32 {
    if later <= earlier {
        return 0;
    }
    let mut months = (later.year() - earlier.year()) * 12
        + later.month() as i32
        - earlier.month() as i32;
    if later.day() < earlier.day() {
        months -= 1;
    }
    months.max(0) as u32
}

fn shift_days(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    if offset >= 0 {
        date.checked_add_days(Days::new(offset as u64))
    } else {
        date.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}
