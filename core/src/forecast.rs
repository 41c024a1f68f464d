//! Forecast engine: short-horizon revenue projection per category.
//!
//! History: trailing calendar months (current month included) of purchases,
//! summed into the four reporting categories.
//!
//! Growth per category, from the last `growth_window_months` of history:
//!   - keep months with a non-zero value
//!   - fewer than 2 left → default growth
//!   - else split into earlier/later halves (later takes the odd one),
//!     growth = (later_avg - earlier_avg) / earlier_avg / (n / 2)
//!   - clamp to [min_growth_rate, max_growth_rate]
//!
//! Projection compounds each category from the latest month. The membership
//! line is re-anchored to current MRR whenever it sinks below
//! `membership_floor_ratio` of it.

use crate::{
    config::ForecastConfig,
    interval::first_of_month,
    types::{PurchaseRecord, RevenueCategory},
};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One value per reporting category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryValues {
    pub membership:  f64,
    pub supplement:  f64,
    pub lab_testing: f64,
    pub service:     f64,
}

impl CategoryValues {
    pub fn get(&self, category: RevenueCategory) -> f64 {
        match category {
            RevenueCategory::Membership => self.membership,
            RevenueCategory::Supplement => self.supplement,
            RevenueCategory::LabTesting => self.lab_testing,
            RevenueCategory::Service    => self.service,
        }
    }

    pub fn get_mut(&mut self, category: RevenueCategory) -> &mut f64 {
        match category {
            RevenueCategory::Membership => &mut self.membership,
            RevenueCategory::Supplement => &mut self.supplement,
            RevenueCategory::LabTesting => &mut self.lab_testing,
            RevenueCategory::Service    => &mut self.service,
        }
    }

    pub fn total(&self) -> f64 {
        self.membership + self.supplement + self.lab_testing + self.service
    }

    fn add(&mut self, other: &CategoryValues) {
        for cat in RevenueCategory::ALL {
            *self.get_mut(cat) += other.get(cat);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month:   NaiveDate,
    pub label:   String,
    pub amounts: CategoryValues,
    pub total:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    /// 1-based offset from the current month.
    pub period:      u32,
    pub month:       NaiveDate,
    pub label:       String,
    pub amounts:     CategoryValues,
    pub total:       f64,
    /// Whether the membership line was re-anchored to current MRR this period.
    pub re_anchored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_forecast:        f64,
    pub end_of_horizon_total:  f64,
    pub category_totals:       CategoryValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueForecast {
    pub history:      Vec<MonthlyRevenue>,
    pub growth_rates: CategoryValues,
    pub base:         CategoryValues,
    pub periods:      Vec<ForecastPeriod>,
    pub summary:      ForecastSummary,
}

fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

/// Per-category purchase totals for the `months` calendar months ending
/// with the month containing `today`, oldest first.
pub fn monthly_history(purchases: &[PurchaseRecord], today: NaiveDate, months: u32) -> Vec<MonthlyRevenue> {
    let current = first_of_month(today);
    let mut history: Vec<MonthlyRevenue> = (0..months)
        .rev()
        .map(|back| {
            let month = current - Months::new(back);
            MonthlyRevenue {
                month,
                label: month_label(month),
                amounts: CategoryValues::default(),
                total: 0.0,
            }
        })
        .collect();

    for p in purchases {
        let month = first_of_month(p.purchased_at.date());
        if let Some(slot) = history.iter_mut().find(|h| h.month == month) {
            *slot.amounts.get_mut(p.category()) += p.amount.max(0.0);
        }
    }
    for h in &mut history {
        h.total = h.amounts.total();
    }
    history
}

/// Monthly growth estimate for one category's series, oldest first.
pub fn growth_rate(values: &[f64], config: &ForecastConfig) -> f64 {
    let qualifying: Vec<f64> = values.iter().copied().filter(|v| *v != 0.0).collect();
    if qualifying.len() < 2 {
        return config.default_growth_rate;
    }

    let mid = qualifying.len() / 2;
    let (earlier, later) = qualifying.split_at(mid);
    let earlier_avg = earlier.iter().sum::<f64>() / earlier.len() as f64;
    let later_avg = later.iter().sum::<f64>() / later.len() as f64;

    let half_span = qualifying.len() as f64 / 2.0;
    let raw = (later_avg - earlier_avg) / earlier_avg / half_span;
    if !raw.is_finite() {
        return config.default_growth_rate;
    }
    raw.clamp(config.min_growth_rate, config.max_growth_rate)
}

pub fn forecast_revenue(
    purchases: &[PurchaseRecord],
    current_mrr: f64,
    today: NaiveDate,
    config: &ForecastConfig,
) -> RevenueForecast {
    let history = monthly_history(purchases, today, config.history_months);
    let window_start = history.len().saturating_sub(config.growth_window_months as usize);
    let window = &history[window_start..];

    let mut growth_rates = CategoryValues::default();
    for cat in RevenueCategory::ALL {
        let values: Vec<f64> = window.iter().map(|h| h.amounts.get(cat)).collect();
        *growth_rates.get_mut(cat) = growth_rate(&values, config);
    }

    let mut base = history.last().map(|h| h.amounts).unwrap_or_default();
    if base.membership < config.near_zero_threshold {
        base.membership = current_mrr;
    }

    let floor = current_mrr * config.membership_floor_ratio;
    let current_month = first_of_month(today);
    let mut running = base;
    let mut periods = Vec::with_capacity(config.horizon_months as usize);

    for period in 1..=config.horizon_months {
        for cat in RevenueCategory::ALL {
            *running.get_mut(cat) *= 1.0 + growth_rates.get(cat);
        }

        let re_anchored = current_mrr > 0.0 && running.membership < floor;
        if re_anchored {
            running.membership =
                (current_mrr * (1.0 + growth_rates.membership * period as f64)).max(0.0);
        }

        let month = current_month + Months::new(period);
        periods.push(ForecastPeriod {
            period,
            month,
            label: month_label(month),
            amounts: running,
            total: running.total(),
            re_anchored,
        });
    }

    let mut category_totals = CategoryValues::default();
    for p in &periods {
        category_totals.add(&p.amounts);
    }
    let summary = ForecastSummary {
        total_forecast: periods.iter().map(|p| p.total).sum(),
        end_of_horizon_total: periods.last().map(|p| p.total).unwrap_or(0.0),
        category_totals,
    };

    log::debug!(
        "forecast: {} periods, growth m={:.3} s={:.3} l={:.3} v={:.3}",
        periods.len(),
        growth_rates.membership,
        growth_rates.supplement,
        growth_rates.lab_testing,
        growth_rates.service,
    );

    RevenueForecast { history, growth_rates, base, periods, summary }
}
