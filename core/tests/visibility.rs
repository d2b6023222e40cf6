//! Role-based visibility filter tests.

use chrono::Utc;
use servicedesk_core::{
    complaint::{ComplaintRecord, Priority, WorkingStatus},
    role::Role,
    visibility::{is_visible, scope, ComplaintView},
};

fn complaint(created_by: &str, assigned: Option<&str>) -> ComplaintRecord {
    ComplaintRecord::new(
        "cus-1".into(),
        created_by.into(),
        "Compressor rattles".into(),
        Priority::Low,
        assigned.map(String::from),
        Utc::now(),
    )
    .unwrap()
}

/// Admins see every live complaint, whoever created or works it.
#[test]
fn admin_sees_all_live_complaints() {
    let c = complaint("emp-c1", Some("emp-m1"));
    assert!(is_visible(&c, Role::Admin, "emp-admin"));
}

/// Deleted complaints are invisible to every role, admins included.
#[test]
fn deleted_complaints_are_invisible_to_everyone() {
    let mut c = complaint("emp-c1", Some("emp-m1"));
    c.is_deleted = true;

    assert!(!is_visible(&c, Role::Admin, "emp-admin"));
    assert!(!is_visible(&c, Role::Coordinator, "emp-c1"));
    assert!(!is_visible(&c, Role::Mechanic, "emp-m1"));
}

/// Coordinators are scoped to the complaints they created.
#[test]
fn coordinator_sees_only_own_complaints() {
    let mine = complaint("emp-c1", None);
    let theirs = complaint("emp-c2", None);

    assert!(is_visible(&mine, Role::Coordinator, "emp-c1"));
    assert!(!is_visible(&theirs, Role::Coordinator, "emp-c1"));
}

/// A mechanic sees a complaint iff it is assigned to them — the status
/// never widens the scope.
#[test]
fn mechanic_scope_is_assignment_regardless_of_status() {
    let statuses = [
        WorkingStatus::Pending,
        WorkingStatus::Accepted,
        WorkingStatus::Rejected,
        WorkingStatus::Processing,
        WorkingStatus::Completed,
    ];
    for status in statuses {
        let mut mine = complaint("emp-c1", Some("emp-m1"));
        mine.working_status = status;
        let mut theirs = complaint("emp-c1", Some("emp-m2"));
        theirs.working_status = status;
        let mut unassigned = complaint("emp-c1", None);
        unassigned.working_status = status;

        assert!(is_visible(&mine, Role::Mechanic, "emp-m1"), "status {status}");
        assert!(!is_visible(&theirs, Role::Mechanic, "emp-m1"), "status {status}");
        assert!(!is_visible(&unassigned, Role::Mechanic, "emp-m1"), "status {status}");
    }
}

/// The pending-only view narrows a listing to pending complaints.
#[test]
fn pending_view_restricts_to_pending() {
    let pending = complaint("emp-c1", Some("emp-m1"));
    let mut accepted = complaint("emp-c1", Some("emp-m1"));
    accepted.working_status = WorkingStatus::Accepted;

    let all = scope(
        vec![pending.clone(), accepted.clone()],
        Role::Mechanic,
        "emp-m1",
        ComplaintView::All,
    );
    assert_eq!(all.len(), 2);

    let queue = scope(
        vec![pending.clone(), accepted],
        Role::Mechanic,
        "emp-m1",
        ComplaintView::PendingOnly,
    );
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].complaint_id, pending.complaint_id);
}
