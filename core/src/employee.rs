//! Employee directory records — admins, coordinators, mechanics.

use crate::{
    customer::validate_contact,
    error::DeskResult,
    role::Role,
    types::EntityId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EntityId,
    pub name: String,
    pub role: Role,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl EmployeeRecord {
    pub fn new(
        name: String,
        role: Role,
        email: String,
        phone: String,
        now: DateTime<Utc>,
    ) -> DeskResult<Self> {
        validate_contact(&name, &email, &phone)?;
        Ok(Self {
            employee_id: format!("emp-{}", Uuid::new_v4()),
            name,
            role,
            email,
            phone,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        })
    }
}
