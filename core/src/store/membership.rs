use super::{decode_real, format_date, parse_date, parse_optional_date, RecordStore};
use crate::{
    error::AnalyticsResult,
    types::{MembershipRecord, MembershipStatus, ProgramType, Tier},
};
use rusqlite::{params, types::Value};

struct MembershipRow {
    id:            String,
    client_id:     String,
    tier:          String,
    program_type:  Option<String>,
    status:        String,
    monthly_price: Value,
    start_date:    String,
    end_date:      Option<String>,
    renewal_date:  Option<String>,
}

/// Untyped membership columns, written as-is.
#[derive(Debug, Clone, Default)]
pub struct RawMembership<'a> {
    pub id:            &'a str,
    pub client_id:     &'a str,
    pub tier:          &'a str,
    pub program_type:  Option<&'a str>,
    pub status:        &'a str,
    /// Stored as text; the column's REAL affinity converts numeric text.
    pub monthly_price: Option<&'a str>,
    pub start_date:    &'a str,
    pub end_date:      Option<&'a str>,
    pub renewal_date:  Option<&'a str>,
}

impl MembershipRow {
    fn decode(self) -> Result<MembershipRecord, String> {
        let tier = Tier::parse(&self.tier)
            .ok_or_else(|| format!("unknown tier '{}'", self.tier))?;
        let status = MembershipStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown status '{}'", self.status))?;
        let monthly_price = decode_real(self.monthly_price)
            .map_err(|v| format!("bad monthly_price {v}"))?;
        let start_date = parse_date(&self.start_date)
            .ok_or_else(|| format!("bad start_date '{}'", self.start_date))?;
        let end_date = parse_optional_date(self.end_date)
            .map_err(|t| format!("bad end_date '{t}'"))?;
        let renewal_date = parse_optional_date(self.renewal_date)
            .map_err(|t| format!("bad renewal_date '{t}'"))?;
        // Unrecognised program types fall back to the default track.
        let program_type = self.program_type.as_deref().and_then(ProgramType::parse);

        Ok(MembershipRecord {
            id: self.id,
            client_id: self.client_id,
            tier,
            program_type,
            status,
            monthly_price,
            start_date,
            end_date,
            renewal_date,
        })
    }
}

impl RecordStore {
    pub fn insert_membership(&self, m: &MembershipRecord) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO membership (
                id, client_id, tier, program_type, status,
                monthly_price, start_date, end_date, renewal_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                m.id,
                m.client_id,
                m.tier.as_str(),
                m.program_type.map(|p| p.as_str()),
                m.status.as_str(),
                m.monthly_price,
                format_date(m.start_date),
                m.end_date.map(format_date),
                m.renewal_date.map(format_date),
            ],
        )?;
        Ok(())
    }

    /// Write a membership row verbatim, bypassing typed encoding.
    /// Used to load rows exported by other tooling.
    pub fn insert_membership_raw(&self, row: &RawMembership<'_>) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO membership (
                id, client_id, tier, program_type, status,
                monthly_price, start_date, end_date, renewal_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.id,
                row.client_id,
                row.tier,
                row.program_type,
                row.status,
                row.monthly_price,
                row.start_date,
                row.end_date,
                row.renewal_date,
            ],
        )?;
        Ok(())
    }

    pub fn all_memberships(&self) -> AnalyticsResult<Vec<MembershipRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, client_id, tier, program_type, status,
                    monthly_price, start_date, end_date, renewal_date
             FROM membership ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MembershipRow {
                    id:            row.get(0)?,
                    client_id:     row.get(1)?,
                    tier:          row.get(2)?,
                    program_type:  row.get(3)?,
                    status:        row.get(4)?,
                    monthly_price: row.get(5)?,
                    start_date:    row.get(6)?,
                    end_date:      row.get(7)?,
                    renewal_date:  row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            match row.decode() {
                Ok(m) => out.push(m),
                Err(reason) => log::warn!("skipping membership {id}: {reason}"),
            }
        }
        Ok(out)
    }

    pub fn membership_count(&self) -> AnalyticsResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM membership", [], |row| row.get(0))?;
        Ok(n)
    }
}
