use super::{parse_col, parse_ts, ts, DeskStore};
use crate::{
    employee::EmployeeRecord,
    error::{DeskError, DeskResult},
    role::Role,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

// Helper function for mapping employee rows
fn employee_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmployeeRecord> {
    Ok(EmployeeRecord {
        employee_id: row.get(0)?,
        name: row.get(1)?,
        role: parse_col(2, row.get(2)?)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        created_at: parse_ts(5, row.get(5)?)?,
        updated_at: parse_ts(6, row.get(6)?)?,
        is_deleted: row.get::<_, i32>(7)? != 0,
    })
}

impl DeskStore {
    // ── Employee ───────────────────────────────────────────────────

    pub fn insert_employee(&self, e: &EmployeeRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO employee (employee_id, name, role, email, phone, created_at, updated_at, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &e.employee_id,
                &e.name,
                e.role.as_str(),
                &e.email,
                &e.phone,
                ts(&e.created_at),
                ts(&e.updated_at),
                if e.is_deleted { 1i32 } else { 0i32 },
            ],
        )?;
        Ok(())
    }

    pub fn get_employee(&self, employee_id: &str) -> DeskResult<EmployeeRecord> {
        self.conn
            .query_row(
                "SELECT employee_id, name, role, email, phone, created_at, updated_at, is_deleted
                 FROM employee WHERE employee_id = ?1",
                params![employee_id],
                employee_row_mapper,
            )
            .optional()?
            .ok_or_else(|| DeskError::NotFound {
                entity: "employee",
                id: employee_id.to_string(),
            })
    }

    pub fn active_employees(&self) -> DeskResult<Vec<EmployeeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_id, name, role, email, phone, created_at, updated_at, is_deleted
             FROM employee WHERE is_deleted = 0
             ORDER BY name ASC, employee_id ASC",
        )?;
        let rows = stmt.query_map([], employee_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn employees_with_role(&self, role: Role) -> DeskResult<Vec<EmployeeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_id, name, role, email, phone, created_at, updated_at, is_deleted
             FROM employee WHERE role = ?1 AND is_deleted = 0
             ORDER BY name ASC, employee_id ASC",
        )?;
        let rows = stmt.query_map(params![role.as_str()], employee_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn soft_delete_employee(
        &self,
        employee_id: &str,
        expected_updated_at: &DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DeskResult<()> {
        let affected = self.conn.execute(
            "UPDATE employee SET is_deleted = 1, updated_at = ?1
             WHERE employee_id = ?2 AND updated_at = ?3",
            params![ts(&now), employee_id, ts(expected_updated_at)],
        )?;
        if affected > 0 {
            return Ok(());
        }
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM employee WHERE employee_id = ?1",
            params![employee_id],
            |row| row.get(0),
        )?;
        if exists {
            Err(DeskError::Conflict {
                entity: "employee",
                id: employee_id.to_string(),
            })
        } else {
            Err(DeskError::NotFound {
                entity: "employee",
                id: employee_id.to_string(),
            })
        }
    }

    pub fn employee_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM employee WHERE is_deleted = 0",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
