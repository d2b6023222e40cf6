//! Customer directory records.

use crate::{
    error::{DeskError, DeskResult},
    types::EntityId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl CustomerRecord {
    pub fn new(
        name: String,
        email: String,
        phone: String,
        now: DateTime<Utc>,
    ) -> DeskResult<Self> {
        validate_contact(&name, &email, &phone)?;
        Ok(Self {
            customer_id: format!("cus-{}", Uuid::new_v4()),
            name,
            email,
            phone,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        })
    }
}

/// Ordinary form validation shared by customers and employees.
pub(crate) fn validate_contact(name: &str, email: &str, phone: &str) -> DeskResult<()> {
    if name.trim().is_empty() {
        return Err(DeskError::EmptyField { field: "name" });
    }
    if email.trim().is_empty() {
        return Err(DeskError::EmptyField { field: "email" });
    }
    if phone.trim().is_empty() {
        return Err(DeskError::EmptyField { field: "phone" });
    }
    Ok(())
}
