//! SQLite-backed record repository.
//!
//! RULE: Only the store talks to the database.
//! Aggregators read from a `RecordSnapshot`; they never execute SQL.
//!
//! Rows are decoded leniently: a row whose dates or enum columns cannot be
//! parsed is logged and skipped, the rest of the stream is returned.

use crate::{
    error::AnalyticsResult,
    repository::RecordRepository,
    types::{ClientRecord, MembershipRecord, PurchaseRecord, Timestamp},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::{types::Value, Connection};

mod client;
mod membership;
mod purchase;

pub use membership::RawMembership;

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) the record database at `path`.
    pub fn open(path: &str) -> AnalyticsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and sample runs).
    pub fn in_memory() -> AnalyticsResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AnalyticsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_records.sql"))?;
        Ok(())
    }

    /// Run `f` inside a single transaction. Used for bulk loads.
    pub fn in_transaction<F>(&mut self, f: F) -> AnalyticsResult<()>
    where
        F: FnOnce(&RecordStore) -> AnalyticsResult<()>,
    {
        self.conn.execute_batch("BEGIN;")?;
        match f(self) {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(e)
            }
        }
    }
}

impl RecordRepository for RecordStore {
    fn list_memberships(&self) -> AnalyticsResult<Vec<MembershipRecord>> {
        self.all_memberships()
    }

    fn list_purchases(&self) -> AnalyticsResult<Vec<PurchaseRecord>> {
        self.all_purchases()
    }

    fn list_clients(&self) -> AnalyticsResult<Vec<ClientRecord>> {
        self.all_clients()
    }
}

// ── Text codecs ──────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_timestamp(ts: Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(text).map(|ts| ts.date()))
}

/// Accepts `T` or space separators, optional fractional seconds, a bare
/// date, or RFC 3339 with an offset (reduced to its UTC wall-clock).
pub(crate) fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .map(crate::types::start_of_day)
}

/// Parse an optional date column. `Err` means present but unparseable.
pub(crate) fn parse_optional_date(text: Option<String>) -> Result<Option<NaiveDate>, String> {
    match text.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => parse_date(t).map(Some).ok_or_else(|| t.to_string()),
    }
}

/// Decode a REAL column. SQLite keeps non-numeric text as text even under
/// REAL affinity, so anything but a number or NULL is rejected here.
/// `Err` carries a printable form of the stored value.
pub(crate) fn decode_real(value: Value) -> Result<Option<f64>, String> {
    match value {
        Value::Null       => Ok(None),
        Value::Integer(i) => Ok(Some(i as f64)),
        Value::Real(r) if r.is_finite() => Ok(Some(r)),
        Value::Real(r)    => Err(r.to_string()),
        Value::Text(t)    => match t.trim().parse::<f64>() {
            Ok(r) if r.is_finite() => Ok(Some(r)),
            _ => Err(format!("'{t}'")),
        },
        Value::Blob(b)    => Err(format!("<{} byte blob>", b.len())),
    }
}
