//! Membership & revenue analytics for the coaching console.
//!
//! A read-only pipeline over two event streams (memberships, purchases)
//! plus the client list: bucketing, point-in-time membership resolution,
//! metric aggregation, period comparison, forecasting and drill-down.

pub mod activity;
pub mod churn;
pub mod comparison;
pub mod config;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod interval;
pub mod mrr;
pub mod name_generator;
pub mod recompute;
pub mod renewal;
pub mod repository;
pub mod resolver;
pub mod retention;
pub mod rng;
pub mod sample_data;
pub mod segment;
pub mod series;
pub mod store;
pub mod tenure;
pub mod types;
