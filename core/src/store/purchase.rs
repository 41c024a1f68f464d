use super::{decode_real, format_timestamp, parse_timestamp, RecordStore};
use crate::{
    error::AnalyticsResult,
    types::{PurchaseRecord, PurchaseType},
};
use rusqlite::{params, types::Value};

impl RecordStore {
    pub fn insert_purchase(&self, p: &PurchaseRecord) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO purchase (id, client_id, purchase_type, amount, purchased_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                p.id,
                p.client_id,
                p.purchase_type.as_str(),
                p.amount,
                format_timestamp(p.purchased_at),
            ],
        )?;
        Ok(())
    }

    /// Write a purchase row verbatim, bypassing typed encoding.
    pub fn insert_purchase_raw(
        &self,
        id: &str,
        client_id: &str,
        purchase_type: &str,
        amount: &str,
        purchased_at: &str,
    ) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO purchase (id, client_id, purchase_type, amount, purchased_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, client_id, purchase_type, amount, purchased_at],
        )?;
        Ok(())
    }

    pub fn all_purchases(&self) -> AnalyticsResult<Vec<PurchaseRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, client_id, purchase_type, amount, purchased_at
             FROM purchase ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Value>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, client_id, kind, amount, purchased_at) in rows {
            let Some(purchase_type) = PurchaseType::parse(&kind) else {
                log::warn!("skipping purchase {id}: unknown purchase_type '{kind}'");
                continue;
            };
            let amount = match decode_real(amount) {
                Ok(Some(a)) => a,
                Ok(None) => {
                    log::warn!("skipping purchase {id}: missing amount");
                    continue;
                }
                Err(v) => {
                    log::warn!("skipping purchase {id}: bad amount {v}");
                    continue;
                }
            };
            let Some(purchased_at) = parse_timestamp(&purchased_at) else {
                log::warn!("skipping purchase {id}: bad purchased_at '{purchased_at}'");
                continue;
            };
            out.push(PurchaseRecord { id, client_id, purchase_type, amount, purchased_at });
        }
        Ok(out)
    }
}
