use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a queued operation. `Failed` is terminal: the entry is
/// excluded from automatic drains until manually cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Pending,
    Synced,
    Failed,
    Unknown(String),
}

impl QueueStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Synced => "synced",
            QueueStatus::Failed => "failed",
            QueueStatus::Unknown(value) => value.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Synced | QueueStatus::Failed)
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for QueueStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => QueueStatus::Pending,
            "synced" => QueueStatus::Synced,
            "failed" => QueueStatus::Failed,
            other => QueueStatus::Unknown(other.to_string()),
        }
    }
}
