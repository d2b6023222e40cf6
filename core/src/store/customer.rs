use super::{parse_ts, ts, DeskStore};
use crate::{
    customer::CustomerRecord,
    error::{DeskError, DeskResult},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

// Helper function for mapping customer rows
fn customer_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<CustomerRecord> {
    Ok(CustomerRecord {
        customer_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        created_at: parse_ts(4, row.get(4)?)?,
        updated_at: parse_ts(5, row.get(5)?)?,
        is_deleted: row.get::<_, i32>(6)? != 0,
    })
}

impl DeskStore {
    // ── Customer ───────────────────────────────────────────────────

    pub fn insert_customer(&self, c: &CustomerRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO customer (customer_id, name, email, phone, created_at, updated_at, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &c.customer_id,
                &c.name,
                &c.email,
                &c.phone,
                ts(&c.created_at),
                ts(&c.updated_at),
                if c.is_deleted { 1i32 } else { 0i32 },
            ],
        )?;
        Ok(())
    }

    pub fn get_customer(&self, customer_id: &str) -> DeskResult<CustomerRecord> {
        self.conn
            .query_row(
                "SELECT customer_id, name, email, phone, created_at, updated_at, is_deleted
                 FROM customer WHERE customer_id = ?1",
                params![customer_id],
                customer_row_mapper,
            )
            .optional()?
            .ok_or_else(|| DeskError::NotFound {
                entity: "customer",
                id: customer_id.to_string(),
            })
    }

    pub fn active_customers(&self) -> DeskResult<Vec<CustomerRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, name, email, phone, created_at, updated_at, is_deleted
             FROM customer WHERE is_deleted = 0
             ORDER BY name ASC, customer_id ASC",
        )?;
        let rows = stmt.query_map([], customer_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn update_customer(
        &self,
        c: &CustomerRecord,
        expected_updated_at: &DateTime<Utc>,
    ) -> DeskResult<()> {
        let affected = self.conn.execute(
            "UPDATE customer SET name = ?1, email = ?2, phone = ?3, updated_at = ?4, is_deleted = ?5
             WHERE customer_id = ?6 AND updated_at = ?7",
            params![
                &c.name,
                &c.email,
                &c.phone,
                ts(&c.updated_at),
                if c.is_deleted { 1i32 } else { 0i32 },
                &c.customer_id,
                ts(expected_updated_at),
            ],
        )?;
        self.check_customer_write(affected, &c.customer_id)
    }

    pub fn soft_delete_customer(
        &self,
        customer_id: &str,
        expected_updated_at: &DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DeskResult<()> {
        let affected = self.conn.execute(
            "UPDATE customer SET is_deleted = 1, updated_at = ?1
             WHERE customer_id = ?2 AND updated_at = ?3",
            params![ts(&now), customer_id, ts(expected_updated_at)],
        )?;
        self.check_customer_write(affected, customer_id)
    }

    fn check_customer_write(&self, affected: usize, customer_id: &str) -> DeskResult<()> {
        if affected > 0 {
            return Ok(());
        }
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM customer WHERE customer_id = ?1",
            params![customer_id],
            |row| row.get(0),
        )?;
        if exists {
            Err(DeskError::Conflict {
                entity: "customer",
                id: customer_id.to_string(),
            })
        } else {
            Err(DeskError::NotFound {
                entity: "customer",
                id: customer_id.to_string(),
            })
        }
    }

    pub fn customer_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM customer WHERE is_deleted = 0",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
