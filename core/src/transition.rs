//! The status transition rule.
//!
//! RULE: this function is pure. It reads nothing but its arguments and
//! has no side effects. Persisting the outcome and dispatching
//! notifications belong to the caller (see `desk.rs`).

use crate::{
    complaint::WorkingStatus,
    error::{DeskError, DeskResult},
    role::Role,
};

/// A lifecycle action requested against a complaint.
#[derive(Debug, Clone)]
pub enum Action {
    Accept,
    Reject { reason: String },
    Start,
    Complete { report: CompletionReport },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject { .. } => "reject",
            Self::Start => "start",
            Self::Complete { .. } => "complete",
        }
    }
}

/// The completion form a mechanic submits. Photos are already-uploaded
/// URIs; raw files go through the injected `PhotoUploader` first.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub description: String,
    pub photos: Vec<String>,
    pub amount: f64,
    pub payment_method: String,
}

/// Map (current status, actor role, action) to the next status.
///
/// Valid steps, all mechanic-only:
///   pending    --accept--->  accepted
///   pending    --reject--->  rejected   (non-empty reason required)
///   accepted   --start---->  processing
///   processing --complete->  completed  (description + amount >= 0 required)
///
/// Every other combination fails with `InvalidTransition`. Terminal
/// statuses (rejected, completed) admit nothing, so repeating an action
/// against them always fails the same way.
pub fn transition(
    current: WorkingStatus,
    actor: Role,
    action: &Action,
) -> DeskResult<WorkingStatus> {
    use WorkingStatus::*;

    match (current, actor, action) {
        (Pending, Role::Mechanic, Action::Accept) => Ok(Accepted),
        (Pending, Role::Mechanic, Action::Reject { reason }) => {
            if reason.trim().is_empty() {
                return Err(DeskError::MissingReason);
            }
            Ok(Rejected)
        }
        (Accepted, Role::Mechanic, Action::Start) => Ok(Processing),
        (Processing, Role::Mechanic, Action::Complete { report }) => {
            validate_completion(report)?;
            Ok(Completed)
        }
        (from, role, action) => Err(DeskError::InvalidTransition {
            from,
            action: action.name(),
            role,
        }),
    }
}

/// Completion proof needs a non-empty description and a non-negative
/// amount. Photos and payment method are free-form.
pub fn validate_completion(report: &CompletionReport) -> DeskResult<()> {
    if report.description.trim().is_empty() {
        return Err(DeskError::MissingCompletionData {
            field: "description",
        });
    }
    if report.amount < 0.0 {
        return Err(DeskError::MissingCompletionData { field: "amount" });
    }
    Ok(())
}
