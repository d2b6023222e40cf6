use super::{parse_col, parse_ts, ts, DeskStore};
use crate::{
    complaint::{ComplaintRecord, CompletionDetails, WorkingStatus},
    error::{DeskError, DeskResult},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

const COMPLAINT_COLUMNS: &str = "complaint_id, customer_id, created_by, description, priority,
        working_status, assigned_mechanic_id, rejection_reason,
        completion_description, completion_photos, completion_amount,
        completion_payment, completed_at, created_at, updated_at, is_deleted";

// Helper function for mapping complaint rows
fn complaint_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ComplaintRecord> {
    let completion_details = match row.get::<_, Option<String>>(8)? {
        Some(description) => {
            let photos_raw: String = row.get::<_, Option<String>>(9)?.unwrap_or_else(|| "[]".into());
            let photos: Vec<String> = serde_json::from_str(&photos_raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
            })?;
            let completed_at = match row.get::<_, Option<String>>(12)? {
                Some(raw) => parse_ts(12, raw)?,
                None => {
                    return Err(rusqlite::Error::InvalidColumnType(
                        12,
                        "completed_at".into(),
                        rusqlite::types::Type::Null,
                    ))
                }
            };
            Some(CompletionDetails {
                description,
                photos,
                amount: row.get::<_, Option<f64>>(10)?.unwrap_or(0.0),
                payment_method: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
                completed_at,
            })
        }
        None => None,
    };

    Ok(ComplaintRecord {
        complaint_id: row.get(0)?,
        customer_id: row.get(1)?,
        created_by: row.get(2)?,
        description: row.get(3)?,
        priority: parse_col(4, row.get(4)?)?,
        working_status: parse_col(5, row.get(5)?)?,
        assigned_mechanic_id: row.get(6)?,
        rejection_reason: row.get(7)?,
        completion_details,
        created_at: parse_ts(13, row.get(13)?)?,
        updated_at: parse_ts(14, row.get(14)?)?,
        is_deleted: row.get::<_, i32>(15)? != 0,
    })
}

impl DeskStore {
    // ── Complaint ──────────────────────────────────────────────────

    pub fn insert_complaint(&self, c: &ComplaintRecord) -> DeskResult<()> {
        let photos_json = c
            .completion_details
            .as_ref()
            .map(|d| serde_json::to_string(&d.photos))
            .transpose()?;
        self.conn.execute(
            "INSERT INTO complaint (
                complaint_id, customer_id, created_by, description, priority,
                working_status, assigned_mechanic_id, rejection_reason,
                completion_description, completion_photos, completion_amount,
                completion_payment, completed_at, created_at, updated_at, is_deleted
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                &c.complaint_id,
                &c.customer_id,
                &c.created_by,
                &c.description,
                c.priority.as_str(),
                c.working_status.as_str(),
                c.assigned_mechanic_id.as_deref(),
                c.rejection_reason.as_deref(),
                c.completion_details.as_ref().map(|d| d.description.as_str()),
                photos_json.as_deref(),
                c.completion_details.as_ref().map(|d| d.amount),
                c.completion_details.as_ref().map(|d| d.payment_method.as_str()),
                c.completion_details.as_ref().map(|d| ts(&d.completed_at)),
                ts(&c.created_at),
                ts(&c.updated_at),
                if c.is_deleted { 1i32 } else { 0i32 },
            ],
        )?;
        Ok(())
    }

    pub fn get_complaint(&self, complaint_id: &str) -> DeskResult<ComplaintRecord> {
        let sql = format!("SELECT {COMPLAINT_COLUMNS} FROM complaint WHERE complaint_id = ?1");
        self.conn
            .query_row(&sql, params![complaint_id], complaint_row_mapper)
            .optional()?
            .ok_or_else(|| DeskError::NotFound {
                entity: "complaint",
                id: complaint_id.to_string(),
            })
    }

    /// All non-deleted complaints, oldest first. Role scoping happens in
    /// the visibility filter, not here.
    pub fn active_complaints(&self) -> DeskResult<Vec<ComplaintRecord>> {
        let sql = format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaint
             WHERE is_deleted = 0
             ORDER BY created_at ASC, complaint_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Persist a mutated record, guarded by compare-and-swap on
    /// `updated_at`. A stale `expected_updated_at` means someone else
    /// wrote first: the row is left untouched and `Conflict` is returned.
    pub fn update_complaint(
        &self,
        c: &ComplaintRecord,
        expected_updated_at: &DateTime<Utc>,
    ) -> DeskResult<()> {
        let photos_json = c
            .completion_details
            .as_ref()
            .map(|d| serde_json::to_string(&d.photos))
            .transpose()?;
        let affected = self.conn.execute(
            "UPDATE complaint SET
                description = ?1, priority = ?2, working_status = ?3,
                assigned_mechanic_id = ?4, rejection_reason = ?5,
                completion_description = ?6, completion_photos = ?7,
                completion_amount = ?8, completion_payment = ?9,
                completed_at = ?10, updated_at = ?11, is_deleted = ?12
             WHERE complaint_id = ?13 AND updated_at = ?14",
            params![
                &c.description,
                c.priority.as_str(),
                c.working_status.as_str(),
                c.assigned_mechanic_id.as_deref(),
                c.rejection_reason.as_deref(),
                c.completion_details.as_ref().map(|d| d.description.as_str()),
                photos_json.as_deref(),
                c.completion_details.as_ref().map(|d| d.amount),
                c.completion_details.as_ref().map(|d| d.payment_method.as_str()),
                c.completion_details.as_ref().map(|d| ts(&d.completed_at)),
                ts(&c.updated_at),
                if c.is_deleted { 1i32 } else { 0i32 },
                &c.complaint_id,
                ts(expected_updated_at),
            ],
        )?;
        self.check_write(affected, &c.complaint_id)
    }

    /// Soft delete. The record stays in storage; every active view
    /// excludes it from now on.
    pub fn soft_delete_complaint(
        &self,
        complaint_id: &str,
        expected_updated_at: &DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DeskResult<()> {
        let affected = self.conn.execute(
            "UPDATE complaint SET is_deleted = 1, updated_at = ?1
             WHERE complaint_id = ?2 AND updated_at = ?3",
            params![ts(&now), complaint_id, ts(expected_updated_at)],
        )?;
        self.check_write(affected, complaint_id)
    }

    fn check_write(&self, affected: usize, complaint_id: &str) -> DeskResult<()> {
        if affected > 0 {
            return Ok(());
        }
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM complaint WHERE complaint_id = ?1",
            params![complaint_id],
            |row| row.get(0),
        )?;
        if exists {
            Err(DeskError::Conflict {
                entity: "complaint",
                id: complaint_id.to_string(),
            })
        } else {
            Err(DeskError::NotFound {
                entity: "complaint",
                id: complaint_id.to_string(),
            })
        }
    }

    // ── Test / summary helpers ─────────────────────────────────────

    pub fn complaint_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM complaint", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn status_count(&self, status: WorkingStatus) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM complaint
                 WHERE working_status = ?1 AND is_deleted = 0",
                params![status.as_str()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
