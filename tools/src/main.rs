//! analytics-runner: headless dashboard pass for the coaching console.
//!
//! Usage:
//!   analytics-runner --db records.db --from 2024-01-01 --to 2024-06-30
//!   analytics-runner --seed 42 --clients 300 --compare previous --json
//!   analytics-runner --seed 42 --drill 3 --kind revenue
//!   analytics-runner --seed 42 --drill-at 2024-05-14 --kind members

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveDateTime};
use coachdesk_core::{
    comparison::ComparisonMode,
    config::AnalyticsConfig,
    drilldown::DrillDownKind,
    engine::{AnalyticsEngine, DashboardReport, DashboardRequest},
    error::AnalyticsError,
    interval::DateRange,
    repository::RecordSnapshot,
    sample_data::{SampleDataGenerator, SampleParams},
    store::RecordStore,
    types::{start_of_day, MarketingStatus, RevenueCategory},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let clients = parse_arg(&args, "--clients", 200usize);
    let as_json = args.iter().any(|a| a == "--json");
    let db = string_arg(&args, "--db");
    let config_path = string_arg(&args, "--config").unwrap_or("./data/analytics_config.json");

    let now = match string_arg(&args, "--now") {
        Some(s) => parse_now(s)?,
        None => chrono::Local::now().naive_local(),
    };
    let today = now.date();
    let from = date_arg(&args, "--from")?
        .unwrap_or_else(|| today.checked_sub_days(Days::new(180)).unwrap_or(today));
    let to = date_arg(&args, "--to")?.unwrap_or(today);
    let range = DateRange::new(from, to)?;

    let comparison = match string_arg(&args, "--compare") {
        None | Some("none") => ComparisonMode::None,
        Some("previous") => ComparisonMode::PreviousPeriod,
        Some("year") => ComparisonMode::YearOverYear,
        Some(other) => anyhow::bail!("unknown --compare mode '{other}' (none|previous|year)"),
    };

    let config = match AnalyticsConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("using default config: {e}");
            AnalyticsConfig::default()
        }
    };
    let engine = AnalyticsEngine::new(config);

    let mut request = DashboardRequest::new(range, now).with_comparison(comparison);
    if let Some(h) = string_arg(&args, "--months").and_then(|s| s.parse().ok()) {
        request = request.with_forecast_horizon(h);
    }

    let snapshot = match load_snapshot(db, seed, clients, today) {
        Ok(s) => s,
        Err(e) => {
            log::error!("record fetch failed: {e}");
            println!("No data available.");
            return Ok(());
        }
    };

    if let Some(index) = string_arg(&args, "--drill").and_then(|s| s.parse::<usize>().ok()) {
        let kind = parse_kind(string_arg(&args, "--kind").unwrap_or("revenue"))?;
        let drill = engine.drill_down(&snapshot, &request, index, kind)?;
        println!("{}", serde_json::to_string_pretty(&drill)?);
        return Ok(());
    }
    if let Some(day) = date_arg(&args, "--drill-at")? {
        let kind = parse_kind(string_arg(&args, "--kind").unwrap_or("revenue"))?;
        let drill = engine.drill_down_at(&snapshot, &request, start_of_day(day), kind)?;
        println!("{}", serde_json::to_string_pretty(&drill)?);
        return Ok(());
    }

    let report = engine.compute(&snapshot, &request)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn load_snapshot(
    db: Option<&str>,
    seed: u64,
    clients: usize,
    today: NaiveDate,
) -> Result<RecordSnapshot, AnalyticsError> {
    match db {
        Some(path) => {
            let store = RecordStore::open(path)?;
            store.migrate()?;
            RecordSnapshot::load(&store)
        }
        None => {
            let mut params = SampleParams::new(today);
            params.clients = clients;
            Ok(SampleDataGenerator::generate(seed, &params))
        }
    }
}

fn print_summary(report: &DashboardReport) {
    let r = report.intervals.range;
    println!("=== DASHBOARD {} → {} ({:?}, {} buckets) ===",
        r.from, r.to, report.intervals.granularity, report.intervals.len());

    println!();
    println!("  MRR:             ${:.2}", report.mrr.current_mrr);
    println!("  projected ARR:   ${:.2}", report.mrr.projected_annual);
    println!("  active members:  {}", report.mrr.active_count);
    println!("  ARPM:            ${:.2}", report.mrr.avg_revenue_per_member);
    for (tier, seg) in &report.mrr.by_tier {
        println!("    {:<10} {:>4} members  ${:.2}", tier.as_str(), seg.members, seg.mrr);
    }

    println!();
    println!("=== CHURN ({}-day window) ===", report.churn.window_days);
    println!("  cancellations:   {} (prev {}, Δ {:+})",
        report.churn.recent_cancellations,
        report.churn.previous_cancellations,
        report.churn.cancellation_delta);
    println!("  monthly churn:   {:.1}%", report.churn.monthly_churn_rate);
    println!("  lost MRR:        ${:.2}", report.churn.lost_mrr);
    println!("  lifetime churn:  {:.1}%", report.churn.lifetime_churn_rate);
    println!("  retention:       {:.1}%", report.retention.retention_rate);

    println!();
    println!("=== TENURE & RENEWALS ===");
    println!("  avg tenure:      {:.1} months (longest {})",
        report.tenure.avg_tenure_months, report.tenure.longest_tenure_months);
    for band in &report.tenure.distribution {
        println!("    {:<12} {}", band.label, band.count);
    }
    println!("  up for renewal:  {} (${:.2} at risk)",
        report.renewals.upcoming_count, report.renewals.mrr_at_risk);
    println!("  renewal success: {:.1}%", report.renewals.renewal_success_rate);

    println!();
    println!("=== REVENUE TREND ===");
    for point in &report.trends.revenue {
        println!("  {:<10} ${:.2}", point.label, point.value);
    }

    if let Some(cmp) = &report.comparison {
        println!();
        println!("=== VS {} → {} ===", cmp.comparison_range.from, cmp.comparison_range.to);
        let pct = |p: Option<f64>| p.map(|v| format!("{v:+.1}%")).unwrap_or_else(|| "n/a".into());
        println!("  revenue:         ${:.2} vs ${:.2} ({})",
            cmp.window.revenue.current, cmp.window.revenue.previous, pct(cmp.window.revenue.change_pct));
        println!("  new clients:     {} vs {} ({})",
            cmp.window.new_clients.current, cmp.window.new_clients.previous, pct(cmp.window.new_clients.change_pct));
        println!("  MRR at end:      ${:.2} vs ${:.2} ({})",
            cmp.window.mrr_at_end.current, cmp.window.mrr_at_end.previous, pct(cmp.window.mrr_at_end.change_pct));
    }

    println!();
    println!("=== FORECAST ===");
    for p in &report.forecast.periods {
        println!("  {:<10} ${:.2}{}", p.label, p.total, if p.re_anchored { " *" } else { "" });
    }
    println!("  total:           ${:.2}", report.forecast.summary.total_forecast);
}

fn parse_kind(s: &str) -> Result<DrillDownKind> {
    let kind = match s {
        "new_clients" => DrillDownKind::NewClients,
        "cumulative_clients" => DrillDownKind::CumulativeClients,
        "revenue" => DrillDownKind::Revenue,
        "members" => DrillDownKind::ActiveMembers,
        other => {
            if let Some(stage) = other.strip_prefix("stage:").and_then(MarketingStatus::parse) {
                DrillDownKind::MarketingStage(stage)
            } else if let Some(cat) = other
                .strip_prefix("category:")
                .and_then(|c| RevenueCategory::ALL.into_iter().find(|r| r.as_str() == c))
            {
                DrillDownKind::PurchaseCategory(cat)
            } else {
                anyhow::bail!("unknown drill-down kind '{other}'");
            }
        }
    };
    Ok(kind)
}

fn parse_now(s: &str) -> Result<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("--now expects YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got '{s}'"))?;
    Ok(start_of_day(date))
}

fn date_arg(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    string_arg(args, flag)
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("{flag} expects YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
