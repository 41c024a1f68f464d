use super::{format_timestamp, parse_timestamp, RecordStore};
use crate::{
    error::AnalyticsResult,
    types::{ClientRecord, MarketingStatus},
};
use rusqlite::params;

impl RecordStore {
    pub fn insert_client(&self, c: &ClientRecord) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO client (id, full_name, email, created_at, marketing_status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                c.id,
                c.full_name,
                c.email,
                format_timestamp(c.created_at),
                c.marketing_status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn all_clients(&self) -> AnalyticsResult<Vec<ClientRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, full_name, email, created_at, marketing_status
             FROM client ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, full_name, email, created_at, status) in rows {
            let Some(created_at) = parse_timestamp(&created_at) else {
                log::warn!("skipping client {id}: bad created_at '{created_at}'");
                continue;
            };
            let Some(marketing_status) = MarketingStatus::parse(&status) else {
                log::warn!("skipping client {id}: unknown marketing_status '{status}'");
                continue;
            };
            out.push(ClientRecord { id, full_name, email, created_at, marketing_status });
        }
        Ok(out)
    }

    pub fn client_count(&self) -> AnalyticsResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM client", [], |row| row.get(0))?;
        Ok(n)
    }
}
