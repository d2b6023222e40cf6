//! End-to-end desk tests: store, transitions, events, notifications.

use chrono::Utc;
use servicedesk_core::{
    complaint::{ComplaintRecord, Priority, WorkingStatus},
    config::DeskConfig,
    desk::{ComplaintDesk, CompletionForm, NewComplaint},
    error::{DeskError, DeskResult},
    notification::{NotificationTransport, OutboundMessage},
    role::Role,
    store::DeskStore,
    upload::{PhotoFile, PhotoUploader},
    visibility::ComplaintView,
};
use std::sync::{Arc, Mutex};

/// Captures every delivered message for assertions.
struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl NotificationTransport for RecordingTransport {
    fn deliver(&self, message: &OutboundMessage) -> DeskResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Pretends to store photos; returns one URI per file.
struct FakeUploader;

impl PhotoUploader for FakeUploader {
    fn upload_photos(&self, files: &[PhotoFile]) -> DeskResult<Vec<String>> {
        Ok(files
            .iter()
            .map(|f| format!("photo://{}", f.file_name))
            .collect())
    }
}

fn desk() -> (ComplaintDesk, Arc<Mutex<Vec<OutboundMessage>>>) {
    let store = DeskStore::in_memory().unwrap();
    store.migrate().unwrap();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let desk = ComplaintDesk::new(
        store,
        DeskConfig::default(),
        Box::new(RecordingTransport { sent: sent.clone() }),
        Box::new(FakeUploader),
    );
    (desk, sent)
}

/// coordinator, mechanic, customer — the minimum cast.
fn roster(desk: &ComplaintDesk) -> (String, String, String) {
    let coordinator = desk
        .register_employee(
            "Dana Reyes".into(),
            Role::Coordinator,
            "dana@desk.example".into(),
            "+1-555-0100".into(),
        )
        .unwrap();
    let mechanic = desk
        .register_employee(
            "Lee Okafor".into(),
            Role::Mechanic,
            "lee@desk.example".into(),
            "+1-555-0101".into(),
        )
        .unwrap();
    let customer = desk
        .register_customer(
            "Noor Haddad".into(),
            "noor@example.com".into(),
            "+1-555-0199".into(),
        )
        .unwrap();
    (
        coordinator.employee_id,
        mechanic.employee_id,
        customer.customer_id,
    )
}

fn file(desk: &ComplaintDesk, coordinator: &str, customer: &str, mechanic: Option<&str>) -> ComplaintRecord {
    desk.file_complaint(
        coordinator,
        NewComplaint {
            customer_id: customer.into(),
            description: "Boiler drops pressure overnight".into(),
            priority: Priority::High,
            assigned_mechanic_id: mechanic.map(String::from),
        },
    )
    .unwrap()
}

/// File → accept → start → complete. The stored record ends completed
/// with the submitted proof, the audit trail is in order, and the
/// customer got both messages.
#[test]
fn full_lifecycle_end_to_end() {
    let (desk, sent) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let filed = file(&desk, &coordinator, &customer, Some(&mechanic));

    desk.accept_complaint(&mechanic, &filed.complaint_id).unwrap();
    desk.start_work(&mechanic, &filed.complaint_id).unwrap();
    desk.complete_complaint(
        &mechanic,
        &filed.complaint_id,
        CompletionForm {
            description: "Replaced the expansion vessel".into(),
            photos: vec![PhotoFile {
                file_name: "after.jpg".into(),
                bytes: vec![1, 2, 3],
            }],
            amount: 100.0,
            payment_method: "card".into(),
        },
    )
    .unwrap();

    let stored = desk.store.get_complaint(&filed.complaint_id).unwrap();
    assert_eq!(stored.working_status, WorkingStatus::Completed);
    let details = stored.completion_details.as_ref().expect("completion details");
    assert_eq!(details.amount, 100.0);
    assert_eq!(details.photos, vec!["photo://after.jpg".to_string()]);
    assert!(stored.rejection_reason.is_none());

    let types: Vec<String> = desk
        .events_for(&filed.complaint_id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        types,
        vec![
            "complaint_filed",
            "mechanic_assigned",
            "complaint_accepted",
            "repair_started",
            "complaint_completed",
        ]
    );

    // Accepted + completed both went to the customer's phone.
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|m| m.recipient == "+1-555-0199"));
}

/// Rejecting needs a reason; with one, the complaint lands rejected and
/// the coordinator is told.
#[test]
fn reject_requires_reason_then_notifies_coordinator() {
    let (desk, sent) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let filed = file(&desk, &coordinator, &customer, Some(&mechanic));

    let err = desk
        .reject_complaint(&mechanic, &filed.complaint_id, "  ".into())
        .unwrap_err();
    assert!(matches!(err, DeskError::MissingReason), "got {err:?}");

    desk.reject_complaint(&mechanic, &filed.complaint_id, "no spare parts".into())
        .unwrap();
    let stored = desk.store.get_complaint(&filed.complaint_id).unwrap();
    assert_eq!(stored.working_status, WorkingStatus::Rejected);
    assert_eq!(stored.rejection_reason.as_deref(), Some("no spare parts"));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, coordinator);
}

/// Mechanics file no complaints and coordinators assign no one but
/// mechanics.
#[test]
fn filing_and_assignment_are_role_gated() {
    let (desk, _) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);

    let err = desk
        .file_complaint(
            &mechanic,
            NewComplaint {
                customer_id: customer.clone(),
                description: "self-filed".into(),
                priority: Priority::Low,
                assigned_mechanic_id: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DeskError::RoleNotAllowed { .. }), "got {err:?}");

    // Assigning the coordinator as the mechanic is refused.
    let filed = file(&desk, &coordinator, &customer, None);
    let err = desk
        .assign_mechanic(&coordinator, &filed.complaint_id, &coordinator)
        .unwrap_err();
    assert!(matches!(err, DeskError::RoleNotAllowed { .. }), "got {err:?}");
}

/// Assignment is a pending-only operation.
#[test]
fn assignment_only_while_pending() {
    let (desk, _) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let filed = file(&desk, &coordinator, &customer, Some(&mechanic));
    desk.accept_complaint(&mechanic, &filed.complaint_id).unwrap();

    let err = desk
        .assign_mechanic(&coordinator, &filed.complaint_id, &mechanic)
        .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }), "got {err:?}");
}

/// A stale writer loses: the compare-and-swap on updated_at rejects the
/// write and the row is untouched.
#[test]
fn stale_write_fails_with_conflict() {
    let (desk, _) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let filed = file(&desk, &coordinator, &customer, Some(&mechanic));

    // Snapshot, then let the mechanic move the complaint on.
    let stale = desk.store.get_complaint(&filed.complaint_id).unwrap();
    desk.accept_complaint(&mechanic, &filed.complaint_id).unwrap();

    let err = desk
        .store
        .soft_delete_complaint(&filed.complaint_id, &stale.updated_at, Utc::now())
        .unwrap_err();
    assert!(matches!(err, DeskError::Conflict { .. }), "got {err:?}");

    let current = desk.store.get_complaint(&filed.complaint_id).unwrap();
    assert_eq!(current.working_status, WorkingStatus::Accepted);
    assert!(!current.is_deleted);
}

/// Soft delete hides the complaint from every view and blocks further
/// transitions, but the row survives in storage.
#[test]
fn soft_delete_hides_but_keeps_the_record() {
    let (desk, _) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let admin = desk
        .register_employee(
            "Ava Chen".into(),
            Role::Admin,
            "ava@desk.example".into(),
            "+1-555-0103".into(),
        )
        .unwrap();
    let filed = file(&desk, &coordinator, &customer, Some(&mechanic));

    desk.remove_complaint(&coordinator, &filed.complaint_id).unwrap();

    for viewer in [&coordinator, &mechanic, &admin.employee_id] {
        let visible = desk.complaints_for(viewer, ComplaintView::All).unwrap();
        assert!(visible.is_empty(), "viewer {viewer} still sees the complaint");
    }

    let row = desk.store.get_complaint(&filed.complaint_id).unwrap();
    assert!(row.is_deleted);

    let err = desk
        .accept_complaint(&mechanic, &filed.complaint_id)
        .unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }), "got {err:?}");
}

/// A coordinator cannot delete another coordinator's complaint — it is
/// outside their visibility scope.
#[test]
fn coordinators_cannot_delete_foreign_complaints() {
    let (desk, _) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let other = desk
        .register_employee(
            "Remy Fall".into(),
            Role::Coordinator,
            "remy@desk.example".into(),
            "+1-555-0104".into(),
        )
        .unwrap();
    let filed = file(&desk, &coordinator, &customer, Some(&mechanic));

    let err = desk
        .remove_complaint(&other.employee_id, &filed.complaint_id)
        .unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }), "got {err:?}");
    assert!(!desk.store.get_complaint(&filed.complaint_id).unwrap().is_deleted);
}

/// The mechanic's pending queue shows pending assignments only; the
/// full view still carries everything assigned to them.
#[test]
fn mechanic_pending_queue() {
    let (desk, _) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let first = file(&desk, &coordinator, &customer, Some(&mechanic));
    let second = file(&desk, &coordinator, &customer, Some(&mechanic));
    desk.accept_complaint(&mechanic, &first.complaint_id).unwrap();

    let queue = desk
        .complaints_for(&mechanic, ComplaintView::PendingOnly)
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].complaint_id, second.complaint_id);

    let all = desk.complaints_for(&mechanic, ComplaintView::All).unwrap();
    assert_eq!(all.len(), 2);
}

/// An unassigned pending complaint is invisible to mechanics until a
/// coordinator routes it; assignment makes it appear in the queue.
#[test]
fn assignment_brings_the_complaint_into_scope() {
    let (desk, _) = desk();
    let (coordinator, mechanic, customer) = roster(&desk);
    let filed = file(&desk, &coordinator, &customer, None);

    assert!(desk
        .complaints_for(&mechanic, ComplaintView::All)
        .unwrap()
        .is_empty());

    desk.assign_mechanic(&coordinator, &filed.complaint_id, &mechanic)
        .unwrap();
    let queue = desk
        .complaints_for(&mechanic, ComplaintView::PendingOnly)
        .unwrap();
    assert_eq!(queue.len(), 1);
}
