//! Asynchronous provider actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Handle to a provider-side asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    /// Provider action ID
    pub id: u64,

    /// Command the action performs (e.g. "assign_floating_ip")
    pub command: String,

    /// Last observed status
    pub status: ActionStatus,

    /// Progress in percent as reported by the provider
    pub progress: u8,

    pub started: Option<DateTime<Utc>>,

    pub finished: Option<DateTime<Utc>>,
}

impl PendingAction {
    pub fn new(id: u64, command: impl Into<String>, status: ActionStatus) -> Self {
        Self {
            id,
            command: command.into(),
            status,
            progress: 0,
            started: None,
            finished: None,
        }
    }
}

/// Status of a provider action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ActionStatus {
    Running,
    Success,
    Error { code: String, message: String },
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionStatus::Running)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Running => write!(f, "running"),
            ActionStatus::Success => write!(f, "success"),
            ActionStatus::Error { code, .. } => write!(f, "error ({})", code),
        }
    }
}
