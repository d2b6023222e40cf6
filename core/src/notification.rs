//! Notification dispatch — transition to outbound messages.
//!
//! `on_transition` is a pure mapping; delivery goes through the
//! `NotificationTransport` seam. A failed delivery is the transport's
//! problem (retry, dead-letter), never the transition's: the status
//! change is already committed when dispatch runs.

use crate::{
    complaint::{ComplaintRecord, WorkingStatus},
    config::NotificationTemplates,
    customer::CustomerRecord,
    employee::EmployeeRecord,
    error::DeskResult,
};
use serde::{Deserialize, Serialize};

/// A message handed to an external transport (SMS, chat, socket).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub recipient: String,
    pub text: String,
}

/// External delivery seam. Implementations own their delivery guarantees.
pub trait NotificationTransport: Send {
    fn deliver(&self, message: &OutboundMessage) -> DeskResult<()>;
}

/// Transport that writes messages to the log. Used by the runner and as
/// the default when no real SMS/chat backend is wired in.
pub struct LogTransport;

impl NotificationTransport for LogTransport {
    fn deliver(&self, message: &OutboundMessage) -> DeskResult<()> {
        log::info!("notify {}: {}", message.recipient, message.text);
        Ok(())
    }
}

/// Map a committed status change to its outbound messages.
///
/// - accepted, completed → one message to the customer (their phone)
/// - rejected            → one message to the creating coordinator
/// - anything else       → nothing
pub fn on_transition(
    complaint: &ComplaintRecord,
    customer: &CustomerRecord,
    actor: &EmployeeRecord,
    _previous: WorkingStatus,
    templates: &NotificationTemplates,
) -> Vec<OutboundMessage> {
    // Templates key off the new status alone.
    let text = |template: &str| {
        render(template, &complaint.complaint_id, complaint.working_status, &actor.name)
    };
    match complaint.working_status {
        WorkingStatus::Accepted => vec![OutboundMessage {
            recipient: customer.phone.clone(),
            text: text(&templates.accepted),
        }],
        WorkingStatus::Completed => vec![OutboundMessage {
            recipient: customer.phone.clone(),
            text: text(&templates.completed),
        }],
        WorkingStatus::Rejected => vec![OutboundMessage {
            recipient: complaint.created_by.clone(),
            text: text(&templates.rejected),
        }],
        WorkingStatus::Pending | WorkingStatus::Processing => Vec::new(),
    }
}

/// Fill the `{complaint_id}`, `{status}`, `{actor}` placeholders.
fn render(template: &str, complaint_id: &str, status: WorkingStatus, actor: &str) -> String {
    template
        .replace("{complaint_id}", complaint_id)
        .replace("{status}", status.as_str())
        .replace("{actor}", actor)
}
