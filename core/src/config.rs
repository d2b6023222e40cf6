//! Desk configuration, loaded from JSON files in a data directory.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Message templates rendered on status transitions. Placeholders:
/// `{complaint_id}`, `{status}`, `{actor}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTemplates {
    pub accepted: String,
    pub rejected: String,
    pub completed: String,
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        Self {
            accepted: "Your complaint {complaint_id} has been accepted by {actor}.".into(),
            rejected: "Complaint {complaint_id} was rejected by {actor}.".into(),
            completed: "Your complaint {complaint_id} is {status}. Resolved by {actor}.".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NotificationsFile {
    templates: NotificationTemplates,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskConfig {
    pub notifications: NotificationTemplates,
}

impl DeskConfig {
    /// Load configuration from `<data_dir>/notifications.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = Path::new(data_dir).join("notifications.json");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: NotificationsFile = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Self {
            notifications: file.templates,
        })
    }
}
