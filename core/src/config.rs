//! Engine configuration: thresholds and windows for every component.
//!
//! Loaded from `data/analytics_config.json` by the runner.
//! In tests, use `AnalyticsConfig::default()`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntervalConfig {
    /// Ranges spanning at most this many days get daily buckets.
    pub daily_max_span_days: i64,
    /// Ranges spanning at most this many days (and more than the daily
    /// threshold) get weekly buckets. Anything longer is monthly.
    pub weekly_max_span_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChurnConfig {
    pub window_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenewalConfig {
    pub upcoming_horizon_days: i64,
    pub lookback_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastConfig {
    pub history_months:         u32,
    pub growth_window_months:   u32,
    pub horizon_months:         u32,
    pub default_growth_rate:    f64,
    pub min_growth_rate:        f64,
    pub max_growth_rate:        f64,
    /// Membership projection is re-anchored once it drops below this
    /// fraction of current MRR.
    pub membership_floor_ratio: f64,
    /// Historical membership revenue below this is treated as absent.
    pub near_zero_threshold:    f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    pub intervals: IntervalConfig,
    pub churn:     ChurnConfig,
    pub renewal:   RenewalConfig,
    pub forecast:  ForecastConfig,
}

impl AnalyticsConfig {
    /// Load from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalyticsConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.intervals.daily_max_span_days > self.intervals.weekly_max_span_days {
            anyhow::bail!(
                "daily_max_span_days ({}) exceeds weekly_max_span_days ({})",
                self.intervals.daily_max_span_days,
                self.intervals.weekly_max_span_days,
            );
        }
        if self.forecast.min_growth_rate > self.forecast.max_growth_rate {
            anyhow::bail!("forecast growth clamp is inverted");
        }
        if self.forecast.growth_window_months > self.forecast.history_months {
            anyhow::bail!("growth window is longer than the history it reads from");
        }
        Ok(())
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            intervals: IntervalConfig {
                daily_max_span_days:  14,
                weekly_max_span_days: 90,
            },
            churn: ChurnConfig { window_days: 30 },
            renewal: RenewalConfig {
                upcoming_horizon_days: 30,
                lookback_days:         90,
            },
            forecast: ForecastConfig {
                history_months:         12,
                growth_window_months:   6,
                horizon_months:         6,
                default_growth_rate:    0.02,
                min_growth_rate:        -0.10,
                max_growth_rate:        0.20,
                membership_floor_ratio: 0.5,
                near_zero_threshold:    1.0,
            },
        }
    }
}
