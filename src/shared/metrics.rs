use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const UNSET_TS: u64 = 0;

/// Cumulative drain counters. Owned by the sync service instance rather than
/// a process-wide static so independently constructed services never share
/// state.
#[derive(Debug)]
pub struct DrainMetrics {
    success: AtomicU64,
    failure: AtomicU64,
    consecutive_failure: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainMetricsSnapshot {
    pub total_success: u64,
    pub total_failure: u64,
    pub consecutive_failure: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
}

impl DrainMetrics {
    pub const fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            consecutive_failure: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(UNSET_TS),
            last_failure_ms: AtomicU64::new(UNSET_TS),
        }
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failure.store(0, Ordering::Relaxed);
        self.last_success_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failure.fetch_add(1, Ordering::Relaxed);
        self.last_failure_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DrainMetricsSnapshot {
        DrainMetricsSnapshot {
            total_success: self.success.load(Ordering::Relaxed),
            total_failure: self.failure.load(Ordering::Relaxed),
            consecutive_failure: self.consecutive_failure.load(Ordering::Relaxed),
            last_success_ms: timestamp_to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: timestamp_to_option(self.last_failure_ms.load(Ordering::Relaxed)),
        }
    }

    pub fn reset(&self) {
        self.success.store(0, Ordering::Relaxed);
        self.failure.store(0, Ordering::Relaxed);
        self.consecutive_failure.store(0, Ordering::Relaxed);
        self.last_success_ms.store(UNSET_TS, Ordering::Relaxed);
        self.last_failure_ms.store(UNSET_TS, Ordering::Relaxed);
    }
}

impl Default for DrainMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
pub fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

#[inline]
pub fn timestamp_to_option(value: u64) -> Option<u64> {
    if value == UNSET_TS { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_failures_reset_on_success() {
        let metrics = DrainMetrics::new();
        metrics.record_failure();
        metrics.record_failure();
        assert_eq!(metrics.snapshot().consecutive_failure, 2);

        metrics.record_success();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.consecutive_failure, 0);
        assert_eq!(snapshot.total_failure, 2);
        assert_eq!(snapshot.total_success, 1);
        assert!(snapshot.last_success_ms.is_some());
    }
}
