//! The complaint desk — the orchestration layer.
//!
//! Wires the pieces in dependency order: entity store → transition rule
//! → visibility filter → notification dispatch. Each operation is one
//! independent request; concurrent writers against the same record are
//! serialized by the store's compare-and-swap on `updated_at`.

use crate::{
    complaint::{ComplaintRecord, Priority, WorkingStatus},
    config::DeskConfig,
    customer::{validate_contact, CustomerRecord},
    employee::EmployeeRecord,
    error::{DeskError, DeskResult},
    event::{DeskEvent, EventLogEntry},
    notification::{on_transition, NotificationTransport},
    role::Role,
    store::DeskStore,
    transition::{validate_completion, Action, CompletionReport},
    types::EntityId,
    upload::{PhotoFile, PhotoUploader},
    visibility::{self, ComplaintView},
};
use chrono::Utc;

/// The form a coordinator/admin submits to file a complaint.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub customer_id: EntityId,
    pub description: String,
    pub priority: Priority,
    pub assigned_mechanic_id: Option<EntityId>,
}

/// The completion form a mechanic submits, photos still raw.
#[derive(Debug)]
pub struct CompletionForm {
    pub description: String,
    pub photos: Vec<PhotoFile>,
    pub amount: f64,
    pub payment_method: String,
}

pub struct ComplaintDesk {
    pub store: DeskStore,
    config: DeskConfig,
    transport: Box<dyn NotificationTransport>,
    uploader: Box<dyn PhotoUploader>,
}

impl ComplaintDesk {
    pub fn new(
        store: DeskStore,
        config: DeskConfig,
        transport: Box<dyn NotificationTransport>,
        uploader: Box<dyn PhotoUploader>,
    ) -> Self {
        Self {
            store,
            config,
            transport,
            uploader,
        }
    }

    // ── Customer directory ─────────────────────────────────────────

    pub fn register_customer(
        &self,
        name: String,
        email: String,
        phone: String,
    ) -> DeskResult<CustomerRecord> {
        let customer = CustomerRecord::new(name, email, phone, Utc::now())?;
        self.store.insert_customer(&customer)?;
        log::debug!("customer {} registered", customer.customer_id);
        Ok(customer)
    }

    pub fn update_customer(
        &self,
        customer_id: &str,
        name: String,
        email: String,
        phone: String,
    ) -> DeskResult<CustomerRecord> {
        validate_contact(&name, &email, &phone)?;
        let mut customer = self.active_customer(customer_id)?;
        let expected = customer.updated_at;
        customer.name = name;
        customer.email = email;
        customer.phone = phone;
        customer.updated_at = Utc::now();
        self.store.update_customer(&customer, &expected)?;
        Ok(customer)
    }

    pub fn remove_customer(&self, customer_id: &str) -> DeskResult<()> {
        let customer = self.active_customer(customer_id)?;
        self.store
            .soft_delete_customer(&customer.customer_id, &customer.updated_at, Utc::now())
    }

    pub fn customers(&self) -> DeskResult<Vec<CustomerRecord>> {
        self.store.active_customers()
    }

    // ── Employee directory ─────────────────────────────────────────

    pub fn register_employee(
        &self,
        name: String,
        role: Role,
        email: String,
        phone: String,
    ) -> DeskResult<EmployeeRecord> {
        let employee = EmployeeRecord::new(name, role, email, phone, Utc::now())?;
        self.store.insert_employee(&employee)?;
        log::debug!("employee {} ({}) registered", employee.employee_id, employee.role);
        Ok(employee)
    }

    pub fn remove_employee(&self, employee_id: &str) -> DeskResult<()> {
        let employee = self.active_employee(employee_id)?;
        self.store
            .soft_delete_employee(&employee.employee_id, &employee.updated_at, Utc::now())
    }

    pub fn employees(&self) -> DeskResult<Vec<EmployeeRecord>> {
        self.store.active_employees()
    }

    pub fn employees_with_role(&self, role: Role) -> DeskResult<Vec<EmployeeRecord>> {
        self.store.employees_with_role(role)
    }

    // ── Complaint lifecycle ────────────────────────────────────────

    pub fn file_complaint(&self, actor_id: &str, new: NewComplaint) -> DeskResult<ComplaintRecord> {
        let actor = self.active_employee(actor_id)?;
        if !actor.role.manages_complaints() {
            return Err(DeskError::RoleNotAllowed {
                role: actor.role,
                action: "file complaints",
            });
        }
        let customer = self.active_customer(&new.customer_id)?;
        if let Some(mechanic_id) = new.assigned_mechanic_id.as_deref() {
            self.require_mechanic(mechanic_id)?;
        }

        let complaint = ComplaintRecord::new(
            customer.customer_id,
            actor.employee_id.clone(),
            new.description,
            new.priority,
            new.assigned_mechanic_id,
            Utc::now(),
        )?;
        self.store.insert_complaint(&complaint)?;
        self.record_event(
            &complaint.complaint_id,
            &actor.employee_id,
            &DeskEvent::ComplaintFiled {
                complaint_id: complaint.complaint_id.clone(),
                customer_id: complaint.customer_id.clone(),
                priority: complaint.priority,
            },
        )?;
        if let Some(mechanic_id) = complaint.assigned_mechanic_id.clone() {
            self.record_event(
                &complaint.complaint_id,
                &actor.employee_id,
                &DeskEvent::MechanicAssigned {
                    complaint_id: complaint.complaint_id.clone(),
                    mechanic_id,
                },
            )?;
        }
        log::debug!(
            "complaint {} filed by {} (priority {})",
            complaint.complaint_id,
            actor.employee_id,
            complaint.priority
        );
        Ok(complaint)
    }

    /// Route a pending complaint to a mechanic. Only coordinators and
    /// admins assign, and only while the complaint is still pending.
    pub fn assign_mechanic(
        &self,
        actor_id: &str,
        complaint_id: &str,
        mechanic_id: &str,
    ) -> DeskResult<ComplaintRecord> {
        let actor = self.active_employee(actor_id)?;
        if !actor.role.manages_complaints() {
            return Err(DeskError::RoleNotAllowed {
                role: actor.role,
                action: "assign mechanics",
            });
        }
        let mechanic = self.require_mechanic(mechanic_id)?;
        let mut complaint = self.active_complaint(complaint_id)?;
        if complaint.working_status != WorkingStatus::Pending {
            return Err(DeskError::InvalidTransition {
                from: complaint.working_status,
                action: "assign",
                role: actor.role,
            });
        }
        let expected = complaint.updated_at;
        complaint.assigned_mechanic_id = Some(mechanic.employee_id.clone());
        complaint.updated_at = Utc::now();
        self.store.update_complaint(&complaint, &expected)?;
        self.record_event(
            &complaint.complaint_id,
            &actor.employee_id,
            &DeskEvent::MechanicAssigned {
                complaint_id: complaint.complaint_id.clone(),
                mechanic_id: mechanic.employee_id,
            },
        )?;
        Ok(complaint)
    }

    pub fn accept_complaint(
        &self,
        mechanic_id: &str,
        complaint_id: &str,
    ) -> DeskResult<ComplaintRecord> {
        self.run_transition(mechanic_id, complaint_id, Action::Accept)
    }

    pub fn reject_complaint(
        &self,
        mechanic_id: &str,
        complaint_id: &str,
        reason: String,
    ) -> DeskResult<ComplaintRecord> {
        self.run_transition(mechanic_id, complaint_id, Action::Reject { reason })
    }

    pub fn start_work(&self, mechanic_id: &str, complaint_id: &str) -> DeskResult<ComplaintRecord> {
        self.run_transition(mechanic_id, complaint_id, Action::Start)
    }

    pub fn complete_complaint(
        &self,
        mechanic_id: &str,
        complaint_id: &str,
        form: CompletionForm,
    ) -> DeskResult<ComplaintRecord> {
        // Check the form before paying for uploads; the rule sees the
        // same report again (minus photos, which it does not validate).
        let report = CompletionReport {
            description: form.description,
            photos: Vec::new(),
            amount: form.amount,
            payment_method: form.payment_method,
        };
        validate_completion(&report)?;
        let photos = self.uploader.upload_photos(&form.photos)?;
        let report = CompletionReport { photos, ..report };
        self.run_transition(mechanic_id, complaint_id, Action::Complete { report })
    }

    pub fn remove_complaint(&self, actor_id: &str, complaint_id: &str) -> DeskResult<()> {
        let actor = self.active_employee(actor_id)?;
        if !actor.role.manages_complaints() {
            return Err(DeskError::RoleNotAllowed {
                role: actor.role,
                action: "delete complaints",
            });
        }
        let complaint = self.active_complaint(complaint_id)?;
        // A coordinator may only delete complaints they can see.
        if !visibility::is_visible(&complaint, actor.role, &actor.employee_id) {
            return Err(DeskError::NotFound {
                entity: "complaint",
                id: complaint_id.to_string(),
            });
        }
        self.store
            .soft_delete_complaint(&complaint.complaint_id, &complaint.updated_at, Utc::now())?;
        self.record_event(
            &complaint.complaint_id,
            &actor.employee_id,
            &DeskEvent::ComplaintDeleted {
                complaint_id: complaint.complaint_id.clone(),
                actor_id: actor.employee_id.clone(),
            },
        )?;
        Ok(())
    }

    // ── Views ──────────────────────────────────────────────────────

    pub fn complaints_for(
        &self,
        viewer_id: &str,
        view: ComplaintView,
    ) -> DeskResult<Vec<ComplaintRecord>> {
        let viewer = self.active_employee(viewer_id)?;
        let complaints = self.store.active_complaints()?;
        Ok(visibility::scope(
            complaints,
            viewer.role,
            &viewer.employee_id,
            view,
        ))
    }

    pub fn complaint_for(&self, viewer_id: &str, complaint_id: &str) -> DeskResult<ComplaintRecord> {
        let viewer = self.active_employee(viewer_id)?;
        let complaint = self.active_complaint(complaint_id)?;
        if visibility::is_visible(&complaint, viewer.role, &viewer.employee_id) {
            Ok(complaint)
        } else {
            Err(DeskError::NotFound {
                entity: "complaint",
                id: complaint_id.to_string(),
            })
        }
    }

    pub fn events_for(&self, complaint_id: &str) -> DeskResult<Vec<EventLogEntry>> {
        self.store.events_for_entity(complaint_id)
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Apply a mechanic action: load, transition, persist (CAS), record
    /// the event, then dispatch notifications. Delivery failures are
    /// logged and swallowed — the transition is already committed.
    fn run_transition(
        &self,
        mechanic_id: &str,
        complaint_id: &str,
        action: Action,
    ) -> DeskResult<ComplaintRecord> {
        let actor = self.active_employee(mechanic_id)?;
        let mut complaint = self.active_complaint(complaint_id)?;
        let expected = complaint.updated_at;
        let change = complaint.apply(&actor, action, Utc::now())?;
        self.store.update_complaint(&complaint, &expected)?;

        if let Some(event) = transition_event(&complaint, &actor) {
            self.record_event(&complaint.complaint_id, &actor.employee_id, &event)?;
        }
        log::debug!(
            "complaint {}: {} -> {} by {}",
            complaint.complaint_id,
            change.previous,
            change.next,
            actor.employee_id
        );

        let customer = self.store.get_customer(&complaint.customer_id)?;
        for message in on_transition(
            &complaint,
            &customer,
            &actor,
            change.previous,
            &self.config.notifications,
        ) {
            if let Err(e) = self.transport.deliver(&message) {
                log::warn!("notification to {} failed: {e}", message.recipient);
            }
        }
        Ok(complaint)
    }

    fn record_event(&self, entity_id: &str, actor_id: &str, event: &DeskEvent) -> DeskResult<()> {
        let entry = EventLogEntry {
            id: None,
            entity_id: entity_id.to_string(),
            actor_id: actor_id.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
            created_at: Utc::now(),
        };
        self.store.append_event(&entry)
    }

    fn active_employee(&self, employee_id: &str) -> DeskResult<EmployeeRecord> {
        let employee = self.store.get_employee(employee_id)?;
        if employee.is_deleted {
            return Err(DeskError::NotFound {
                entity: "employee",
                id: employee_id.to_string(),
            });
        }
        Ok(employee)
    }

    fn active_customer(&self, customer_id: &str) -> DeskResult<CustomerRecord> {
        let customer = self.store.get_customer(customer_id)?;
        if customer.is_deleted {
            return Err(DeskError::NotFound {
                entity: "customer",
                id: customer_id.to_string(),
            });
        }
        Ok(customer)
    }

    fn active_complaint(&self, complaint_id: &str) -> DeskResult<ComplaintRecord> {
        let complaint = self.store.get_complaint(complaint_id)?;
        if complaint.is_deleted {
            return Err(DeskError::NotFound {
                entity: "complaint",
                id: complaint_id.to_string(),
            });
        }
        Ok(complaint)
    }

    fn require_mechanic(&self, employee_id: &str) -> DeskResult<EmployeeRecord> {
        let employee = self.active_employee(employee_id)?;
        match employee.role {
            Role::Mechanic => Ok(employee),
            role => Err(DeskError::RoleNotAllowed {
                role,
                action: "take complaint assignments",
            }),
        }
    }
}

/// The audit event for a just-applied transition, keyed off the new
/// status. Pending is not a transition target, so it maps to nothing.
fn transition_event(complaint: &ComplaintRecord, actor: &EmployeeRecord) -> Option<DeskEvent> {
    let complaint_id = complaint.complaint_id.clone();
    let mechanic_id = actor.employee_id.clone();
    match complaint.working_status {
        WorkingStatus::Accepted => Some(DeskEvent::ComplaintAccepted {
            complaint_id,
            mechanic_id,
        }),
        WorkingStatus::Rejected => Some(DeskEvent::ComplaintRejected {
            complaint_id,
            mechanic_id,
            reason: complaint.rejection_reason.clone().unwrap_or_default(),
        }),
        WorkingStatus::Processing => Some(DeskEvent::RepairStarted {
            complaint_id,
            mechanic_id,
        }),
        WorkingStatus::Completed => Some(DeskEvent::ComplaintCompleted {
            complaint_id,
            mechanic_id,
            amount: complaint
                .completion_details
                .as_ref()
                .map(|d| d.amount)
                .unwrap_or(0.0),
        }),
        WorkingStatus::Pending => None,
    }
}
