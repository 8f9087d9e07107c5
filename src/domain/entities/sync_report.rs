use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What caused a drain cycle to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainTrigger {
    Interval,
    Reconnect,
    Manual,
}

impl DrainTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainTrigger::Interval => "interval",
            DrainTrigger::Reconnect => "reconnect",
            DrainTrigger::Manual => "manual",
        }
    }
}

impl fmt::Display for DrainTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single drain cycle. `skipped` means another drain was already
/// in progress and this trigger was dropped, not queued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub trigger: DrainTrigger,
    pub attempted: u32,
    pub synced: u32,
    pub failed: u32,
    pub skipped: bool,
}

impl DrainReport {
    pub fn completed(trigger: DrainTrigger, attempted: u32, synced: u32, failed: u32) -> Self {
        Self {
            trigger,
            attempted,
            synced,
            failed,
            skipped: false,
        }
    }

    pub fn skipped(trigger: DrainTrigger) -> Self {
        Self {
            trigger,
            attempted: 0,
            synced: 0,
            failed: 0,
            skipped: true,
        }
    }

    pub fn fully_synced(&self) -> bool {
        !self.skipped && self.failed == 0
    }
}

/// Point-in-time view of the queue, recomputed on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    pub unsynced: u64,
    pub failed: u64,
    pub in_progress: bool,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}
