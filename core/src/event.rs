//! The desk's audit trail.
//!
//! Every recorded action appends one entry to the event log. The chat
//! and SMS add-ons of the wider platform consume this log; the core only
//! writes it.

use crate::{complaint::Priority, types::EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every event the desk records. Variants are added, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    ComplaintFiled {
        complaint_id: EntityId,
        customer_id: EntityId,
        priority: Priority,
    },
    MechanicAssigned {
        complaint_id: EntityId,
        mechanic_id: EntityId,
    },
    ComplaintAccepted {
        complaint_id: EntityId,
        mechanic_id: EntityId,
    },
    ComplaintRejected {
        complaint_id: EntityId,
        mechanic_id: EntityId,
        reason: String,
    },
    RepairStarted {
        complaint_id: EntityId,
        mechanic_id: EntityId,
    },
    ComplaintCompleted {
        complaint_id: EntityId,
        mechanic_id: EntityId,
        amount: f64,
    },
    ComplaintDeleted {
        complaint_id: EntityId,
        actor_id: EntityId,
    },
}

impl DeskEvent {
    /// Stable string name, used for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ComplaintFiled { .. } => "complaint_filed",
            Self::MechanicAssigned { .. } => "mechanic_assigned",
            Self::ComplaintAccepted { .. } => "complaint_accepted",
            Self::ComplaintRejected { .. } => "complaint_rejected",
            Self::RepairStarted { .. } => "repair_started",
            Self::ComplaintCompleted { .. } => "complaint_completed",
            Self::ComplaintDeleted { .. } => "complaint_deleted",
        }
    }
}

/// An event log row as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub entity_id: EntityId,
    pub actor_id: EntityId,
    pub event_type: String,
    /// JSON-serialized DeskEvent.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}
