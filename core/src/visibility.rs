//! Role-based visibility rules.
//!
//! RULE: this filter is pure. Listings load active rows from the store
//! and scope them here; no SQL encodes role logic.

use crate::{
    complaint::{ComplaintRecord, WorkingStatus},
    role::Role,
};

/// Which slice of the visible complaints a listing wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintView {
    /// Everything the viewer may see.
    All,
    /// Only pending complaints — the "waiting on a decision" queue.
    PendingOnly,
}

impl ComplaintView {
    pub fn allows(&self, status: WorkingStatus) -> bool {
        match self {
            Self::All => true,
            Self::PendingOnly => status == WorkingStatus::Pending,
        }
    }
}

/// Whether `viewer_id` (holding `viewer_role`) may see this complaint.
///
/// - Deleted complaints are invisible to everyone, admins included.
/// - Admins see every live complaint.
/// - Coordinators see the complaints they created.
/// - Mechanics see the complaints assigned to them, regardless of status.
pub fn is_visible(complaint: &ComplaintRecord, viewer_role: Role, viewer_id: &str) -> bool {
    if complaint.is_deleted {
        return false;
    }
    match viewer_role {
        Role::Admin => true,
        Role::Coordinator => complaint.created_by == viewer_id,
        Role::Mechanic => complaint.assigned_mechanic_id.as_deref() == Some(viewer_id),
    }
}

/// Scope a batch of complaints to one viewer and view.
pub fn scope(
    complaints: Vec<ComplaintRecord>,
    viewer_role: Role,
    viewer_id: &str,
    view: ComplaintView,
) -> Vec<ComplaintRecord> {
    complaints
        .into_iter()
        .filter(|c| is_visible(c, viewer_role, viewer_id) && view.allows(c.working_status))
        .collect()
}
