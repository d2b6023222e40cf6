use crate::{complaint::WorkingStatus, role::Role};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Action '{action}' is not allowed from status '{from}' for role '{role}'")]
    InvalidTransition {
        from: WorkingStatus,
        action: &'static str,
        role: Role,
    },

    #[error("A rejection requires a non-empty reason")]
    MissingReason,

    #[error("Completion details are missing or invalid: {field}")]
    MissingCompletionData { field: &'static str },

    #[error("Complaint '{complaint_id}' is assigned to a different mechanic")]
    MechanicMismatch { complaint_id: String },

    #[error("Role '{role}' may not {action}")]
    RoleNotAllowed { role: Role, action: &'static str },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} '{id}' was modified concurrently")]
    Conflict { entity: &'static str, id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;

/// Raised when a stored string does not belong to a closed vocabulary
/// (status, role, priority). Only the store's row mappers produce this.
#[derive(Error, Debug)]
#[error("unrecognized {field} value '{value}'")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}
