//! Customer and employee directory tests.

use servicedesk_core::{
    config::DeskConfig,
    desk::{ComplaintDesk, NewComplaint},
    complaint::Priority,
    error::{DeskError, DeskResult},
    notification::{NotificationTransport, OutboundMessage},
    role::Role,
    store::DeskStore,
    upload::{PhotoFile, PhotoUploader},
};

struct NullTransport;

impl NotificationTransport for NullTransport {
    fn deliver(&self, _message: &OutboundMessage) -> DeskResult<()> {
        Ok(())
    }
}

struct NullUploader;

impl PhotoUploader for NullUploader {
    fn upload_photos(&self, _files: &[PhotoFile]) -> DeskResult<Vec<String>> {
        Ok(Vec::new())
    }
}

fn desk() -> ComplaintDesk {
    let store = DeskStore::in_memory().unwrap();
    store.migrate().unwrap();
    ComplaintDesk::new(
        store,
        DeskConfig::default(),
        Box::new(NullTransport),
        Box::new(NullUploader),
    )
}

/// Register, read back, update.
#[test]
fn customer_roundtrip_and_update() {
    let desk = desk();
    let created = desk
        .register_customer(
            "Noor Haddad".into(),
            "noor@example.com".into(),
            "+1-555-0199".into(),
        )
        .unwrap();

    let loaded = desk.store.get_customer(&created.customer_id).unwrap();
    assert_eq!(loaded.name, "Noor Haddad");

    let updated = desk
        .update_customer(
            &created.customer_id,
            "Noor Haddad".into(),
            "noor@new.example".into(),
            "+1-555-0199".into(),
        )
        .unwrap();
    assert_eq!(updated.email, "noor@new.example");
    assert!(updated.updated_at >= loaded.updated_at);
}

/// Blank contact fields are form errors, not rows.
#[test]
fn blank_fields_are_rejected() {
    let desk = desk();

    let err = desk
        .register_customer("  ".into(), "a@b.example".into(), "+1".into())
        .unwrap_err();
    assert!(matches!(err, DeskError::EmptyField { field: "name" }), "got {err:?}");

    let err = desk
        .register_employee("Lee".into(), Role::Mechanic, "".into(), "+1".into())
        .unwrap_err();
    assert!(matches!(err, DeskError::EmptyField { field: "email" }), "got {err:?}");

    assert_eq!(desk.store.customer_count().unwrap(), 0);
    assert_eq!(desk.store.employee_count().unwrap(), 0);
}

/// Role listings return only live employees of that role.
#[test]
fn employees_filtered_by_role() {
    let desk = desk();
    desk.register_employee("Dana".into(), Role::Coordinator, "d@x.example".into(), "+1".into())
        .unwrap();
    let lee = desk
        .register_employee("Lee".into(), Role::Mechanic, "l@x.example".into(), "+1".into())
        .unwrap();
    let sam = desk
        .register_employee("Sam".into(), Role::Mechanic, "s@x.example".into(), "+1".into())
        .unwrap();
    desk.remove_employee(&sam.employee_id).unwrap();

    let mechanics = desk.employees_with_role(Role::Mechanic).unwrap();
    assert_eq!(mechanics.len(), 1);
    assert_eq!(mechanics[0].employee_id, lee.employee_id);
    assert_eq!(desk.employees().unwrap().len(), 2);
}

/// Customer updates are compare-and-swap guarded like complaints.
#[test]
fn stale_customer_update_conflicts() {
    let desk = desk();
    let created = desk
        .register_customer("Ravi".into(), "ravi@example.com".into(), "+1-555-0198".into())
        .unwrap();
    let stale = desk.store.get_customer(&created.customer_id).unwrap();

    desk.update_customer(
        &created.customer_id,
        "Ravi Patel".into(),
        "ravi@example.com".into(),
        "+1-555-0198".into(),
    )
    .unwrap();

    let err = desk
        .store
        .update_customer(&stale, &stale.updated_at)
        .unwrap_err();
    assert!(matches!(err, DeskError::Conflict { .. }), "got {err:?}");
    assert_eq!(
        desk.store.get_customer(&created.customer_id).unwrap().name,
        "Ravi Patel"
    );
}

/// Filing against a removed customer fails; the complaint never lands.
#[test]
fn removed_customer_takes_no_complaints() {
    let desk = desk();
    let coordinator = desk
        .register_employee("Dana".into(), Role::Coordinator, "d@x.example".into(), "+1".into())
        .unwrap();
    let customer = desk
        .register_customer("Noor".into(), "noor@example.com".into(), "+1".into())
        .unwrap();
    desk.remove_customer(&customer.customer_id).unwrap();

    let err = desk
        .file_complaint(
            &coordinator.employee_id,
            NewComplaint {
                customer_id: customer.customer_id.clone(),
                description: "Heater leaks".into(),
                priority: Priority::Medium,
                assigned_mechanic_id: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }), "got {err:?}");
    assert_eq!(desk.store.complaint_count().unwrap(), 0);

    // The row itself survives the soft delete.
    assert!(desk.store.get_customer(&customer.customer_id).unwrap().is_deleted);
}
