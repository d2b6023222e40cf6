//! servicedesk-core — the domain core of the service-complaint desk.
//!
//! Complaints move through a fixed lifecycle:
//!   pending → accepted → processing → completed
//!   pending → rejected
//!
//! RULES:
//!   - Status and role vocabularies are closed enums. No status or role
//!     string exists outside `complaint.rs` / `role.rs`.
//!   - The transition rule is pure. It never touches the store.
//!   - Only the store module talks to SQLite.
//!   - Notification delivery never blocks or rolls back a transition.
//!
//! The desk module wires the pieces in dependency order:
//! store → transition rule → visibility filter → notification dispatch.

pub mod complaint;
pub mod config;
pub mod customer;
pub mod desk;
pub mod employee;
pub mod error;
pub mod event;
pub mod notification;
pub mod role;
pub mod store;
pub mod transition;
pub mod types;
pub mod upload;
pub mod visibility;
