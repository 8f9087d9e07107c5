use crate::domain::value_objects::{EntityTable, RecordId};
use crate::shared::config::SaveGuardConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

struct SaveEntry {
    in_flight: bool,
    last_completed: Option<Instant>,
}

/// Per-record debounce and single-flight guard. Exists to stop runaway
/// repeated-save loops: while a save for a record is in flight, or within the
/// debounce window after one completed, further save requests for the same
/// record are dropped. A drop is not an error; the intent is already
/// satisfied by the save that went through.
pub struct SaveGuard {
    entries: Mutex<HashMap<String, SaveEntry>>,
    debounce: Duration,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveGuardStatus {
    pub in_flight: Vec<String>,
    pub recently_completed: Vec<RecentCompletion>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecentCompletion {
    pub record: String,
    pub completed_ms_ago: u64,
}

impl SaveGuard {
    pub fn new(config: &SaveGuardConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            debounce: Duration::from_millis(config.debounce_ms),
        }
    }

    fn key(table: EntityTable, id: &RecordId) -> String {
        format!("{table}:{id}")
    }

    /// Returns false when the record already has a save in flight or
    /// completed one inside the debounce window. Returning true marks the
    /// record in flight; the caller owes a matching `end_save` on every path.
    pub async fn begin_save(&self, table: EntityTable, id: &RecordId) -> bool {
        let key = Self::key(table, id);
        let mut entries = self.entries.lock().await;
        Self::prune(&mut entries, self.debounce);

        let entry = entries.entry(key.clone()).or_insert(SaveEntry {
            in_flight: false,
            last_completed: None,
        });

        if entry.in_flight {
            debug!(
                target: "sync::guard",
                record = %key,
                "dropping save request, another save is in flight"
            );
            return false;
        }

        if let Some(completed) = entry.last_completed {
            if completed.elapsed() < self.debounce {
                debug!(
                    target: "sync::guard",
                    record = %key,
                    "dropping save request inside the debounce window"
                );
                return false;
            }
        }

        entry.in_flight = true;
        true
    }

    /// Clears the in-flight flag and starts the debounce window. Callers run
    /// this on success and failure alike; skipping it would block the record
    /// forever.
    pub async fn end_save(&self, table: EntityTable, id: &RecordId) {
        let key = Self::key(table, id);
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get_mut(&key) {
            entry.in_flight = false;
            entry.last_completed = Some(Instant::now());
        }
    }

    pub async fn status(&self) -> SaveGuardStatus {
        let mut entries = self.entries.lock().await;
        Self::prune(&mut entries, self.debounce);

        let mut in_flight = Vec::new();
        let mut recently_completed = Vec::new();
        for (key, entry) in entries.iter() {
            if entry.in_flight {
                in_flight.push(key.clone());
            } else if let Some(completed) = entry.last_completed {
                recently_completed.push(RecentCompletion {
                    record: key.clone(),
                    completed_ms_ago: completed.elapsed().as_millis() as u64,
                });
            }
        }
        in_flight.sort();
        recently_completed.sort_by(|a, b| a.record.cmp(&b.record));

        SaveGuardStatus {
            in_flight,
            recently_completed,
        }
    }

    /// Emergency escape hatch: forgets all in-flight and debounce state.
    pub async fn force_reset_all(&self) {
        let mut entries = self.entries.lock().await;
        let dropped = entries.len();
        entries.clear();
        warn!(
            target: "sync::guard",
            dropped,
            "save guard state forcibly reset"
        );
    }

    fn prune(entries: &mut HashMap<String, SaveEntry>, debounce: Duration) {
        entries.retain(|_, entry| {
            if entry.in_flight {
                return true;
            }
            match entry.last_completed {
                Some(completed) => completed.elapsed() < debounce,
                None => false,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(debounce_ms: u64) -> SaveGuard {
        SaveGuard::new(&SaveGuardConfig { debounce_ms })
    }

    fn record(id: &str) -> RecordId {
        RecordId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn second_begin_without_end_is_rejected() {
        let guard = guard(1000);
        let id = record("m2");

        assert!(guard.begin_save(EntityTable::Members, &id).await);
        assert!(!guard.begin_save(EntityTable::Members, &id).await);

        let status = guard.status().await;
        assert_eq!(status.in_flight, vec!["members:m2".to_string()]);
    }

    #[tokio::test]
    async fn begin_inside_debounce_window_is_rejected() {
        let guard = guard(60_000);
        let id = record("m2");

        assert!(guard.begin_save(EntityTable::Members, &id).await);
        guard.end_save(EntityTable::Members, &id).await;

        assert!(!guard.begin_save(EntityTable::Members, &id).await);
    }

    #[tokio::test]
    async fn begin_after_debounce_window_is_accepted() {
        let guard = guard(20);
        let id = record("m2");

        assert!(guard.begin_save(EntityTable::Members, &id).await);
        guard.end_save(EntityTable::Members, &id).await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(guard.begin_save(EntityTable::Members, &id).await);
    }

    #[tokio::test]
    async fn records_are_independent() {
        let guard = guard(60_000);

        assert!(guard.begin_save(EntityTable::Members, &record("a")).await);
        assert!(guard.begin_save(EntityTable::Members, &record("b")).await);
        assert!(guard.begin_save(EntityTable::Products, &record("a")).await);
    }

    #[tokio::test]
    async fn force_reset_unblocks_everything() {
        let guard = guard(60_000);
        let id = record("m2");

        assert!(guard.begin_save(EntityTable::Members, &id).await);
        guard.force_reset_all().await;

        assert!(guard.begin_save(EntityTable::Members, &id).await);
        assert_eq!(guard.status().await.recently_completed.len(), 0);
    }
}
