//! Complaint records and the lifecycle vocabulary.
//!
//! INVARIANTS (checked by `apply`, asserted by the test suite):
//!   - `rejection_reason` is set iff the status is `Rejected`.
//!   - `completion_details` is set iff the status is `Completed`.
//!   - A complaint is assigned to a mechanic before it can become
//!     `Accepted`, `Processing`, or `Completed`.
//!   - Soft-deleted complaints never transition.

use crate::{
    employee::EmployeeRecord,
    error::{DeskError, DeskResult, ParseEnumError},
    transition::{transition, Action},
    types::EntityId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// The canonical lifecycle vocabulary. Storage and wire formats use the
/// snake_case spellings below and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingStatus {
    Pending,
    Accepted,
    Rejected,
    Processing,
    Completed,
}

impl WorkingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }
}

impl fmt::Display for WorkingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            other => Err(ParseEnumError {
                field: "working_status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParseEnumError {
                field: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Proof-of-work captured when a complaint is marked completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionDetails {
    pub description: String,
    /// URIs returned by the injected photo uploader.
    pub photos: Vec<String>,
    pub amount: f64,
    pub payment_method: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub previous: WorkingStatus,
    pub next: WorkingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub complaint_id: EntityId,
    pub customer_id: EntityId,
    /// Employee id of the coordinator/admin who filed the complaint.
    pub created_by: EntityId,
    pub description: String,
    pub priority: Priority,
    pub working_status: WorkingStatus,
    pub assigned_mechanic_id: Option<EntityId>,
    pub rejection_reason: Option<String>,
    pub completion_details: Option<CompletionDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl ComplaintRecord {
    /// A freshly filed complaint. Always starts pending, never deleted.
    pub fn new(
        customer_id: EntityId,
        created_by: EntityId,
        description: String,
        priority: Priority,
        assigned_mechanic_id: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> DeskResult<Self> {
        if description.trim().is_empty() {
            return Err(DeskError::EmptyField {
                field: "description",
            });
        }
        Ok(Self {
            complaint_id: format!("cmp-{}", Uuid::new_v4()),
            customer_id,
            created_by,
            description,
            priority,
            working_status: WorkingStatus::Pending,
            assigned_mechanic_id,
            rejection_reason: None,
            completion_details: None,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        })
    }

    /// Apply a lifecycle action on behalf of `actor`.
    ///
    /// The pure transition rule decides whether the step is legal; this
    /// method layers the record-level invariants on top: mechanic binding,
    /// rejection reason, completion details, `updated_at`. The caller
    /// persists the record and dispatches notifications afterwards.
    pub fn apply(
        &mut self,
        actor: &EmployeeRecord,
        action: Action,
        now: DateTime<Utc>,
    ) -> DeskResult<StatusChange> {
        if self.is_deleted {
            return Err(DeskError::NotFound {
                entity: "complaint",
                id: self.complaint_id.clone(),
            });
        }

        let previous = self.working_status;
        let next = transition(previous, actor.role, &action)?;

        // Deciding on an unassigned complaint (accept or reject) claims it
        // for the acting mechanic. Every other case requires the actor to
        // be the assigned mechanic.
        let assigned = self.assigned_mechanic_id.clone();
        match (&action, assigned.as_deref()) {
            (Action::Accept | Action::Reject { .. }, None) => {
                self.assigned_mechanic_id = Some(actor.employee_id.clone());
            }
            (_, Some(assigned)) if assigned == actor.employee_id => {}
            _ => {
                return Err(DeskError::MechanicMismatch {
                    complaint_id: self.complaint_id.clone(),
                });
            }
        }

        match action {
            Action::Accept | Action::Start => {}
            Action::Reject { reason } => {
                self.rejection_reason = Some(reason.trim().to_string());
            }
            Action::Complete { report } => {
                self.completion_details = Some(CompletionDetails {
                    description: report.description,
                    photos: report.photos,
                    amount: report.amount,
                    payment_method: report.payment_method,
                    completed_at: now,
                });
            }
        }

        self.working_status = next;
        self.updated_at = now;
        Ok(StatusChange { previous, next })
    }
}
