use crate::application::ports::OperationQueueStore;
use crate::shared::error::AppError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Receives maintenance reports; lets a host application forward them to its
/// UI without this crate knowing how.
pub trait MaintenanceEventSink: Send + Sync {
    fn emit_report(&self, report: &QueueMaintenanceReport) -> Result<(), String>;
    fn emit_failure(&self, message: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedOperationDigest {
    pub operation_id: String,
    pub table: String,
    pub record_id: String,
    pub retry_count: u32,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMaintenanceReport {
    pub pending_count: usize,
    pub failed_count: usize,
    pub pruned_synced: u64,
    pub oldest_pending_secs: Option<i64>,
    pub failed_operations: Vec<FailedOperationDigest>,
    pub emitted_at: i64,
}

/// Periodic queue housekeeping: prunes synced entries past the audit
/// retention window and surfaces what is still pending or stuck. Gated so
/// overlapping triggers run one at a time.
pub struct QueueMaintenanceJob {
    sink: Option<Arc<dyn MaintenanceEventSink>>,
    queue: Arc<dyn OperationQueueStore>,
    retention: Duration,
    gate: Mutex<()>,
}

impl QueueMaintenanceJob {
    pub fn new(queue: Arc<dyn OperationQueueStore>, retention: Duration) -> Arc<Self> {
        Self::with_sink(None, queue, retention)
    }

    pub fn with_sink(
        sink: Option<Arc<dyn MaintenanceEventSink>>,
        queue: Arc<dyn OperationQueueStore>,
        retention: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            sink,
            queue,
            retention,
            gate: Mutex::new(()),
        })
    }

    pub fn trigger(self: &Arc<Self>) {
        let job = Arc::clone(self);
        tokio::spawn(async move {
            job.run_guarded().await;
        });
    }

    pub async fn run_once(&self) -> Result<QueueMaintenanceReport, AppError> {
        let pruned_synced = self.queue.prune_synced(self.retention).await?;
        let pending = self.queue.list_pending().await?;
        let failed = self.queue.list_failed().await?;

        let now = Utc::now();
        let oldest_pending_secs = pending
            .first()
            .map(|op| (now - op.created_at).num_seconds());

        let report = QueueMaintenanceReport {
            pending_count: pending.len(),
            failed_count: failed.len(),
            pruned_synced,
            oldest_pending_secs,
            failed_operations: failed
                .into_iter()
                .map(|op| FailedOperationDigest {
                    operation_id: op.operation_id.to_string(),
                    table: op.table.to_string(),
                    record_id: op.record_id.to_string(),
                    retry_count: op.retry_count,
                    error_message: op.error_message,
                })
                .collect(),
            emitted_at: now.timestamp_millis(),
        };

        Ok(report)
    }

    async fn run_guarded(self: Arc<Self>) {
        let _guard = self.gate.lock().await;
        match self.run_once().await {
            Ok(report) => self.emit_success(&report),
            Err(err) => self.emit_failure(&err.to_string()),
        }
    }

    fn emit_success(&self, report: &QueueMaintenanceReport) {
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.emit_report(report) {
                tracing::warn!(
                    target: "sync::maintenance",
                    error = %err,
                    "failed to deliver maintenance report"
                );
            }
        }
        tracing::info!(
            target: "sync::maintenance",
            pending = report.pending_count,
            failed = report.failed_count,
            pruned = report.pruned_synced,
            "queue maintenance completed"
        );
    }

    fn emit_failure(&self, message: &str) {
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.emit_failure(message) {
                tracing::warn!(
                    target: "sync::maintenance",
                    error = %err,
                    "failed to deliver maintenance failure"
                );
            }
        }
        tracing::error!(
            target: "sync::maintenance",
            error = message,
            "queue maintenance failed"
        );
    }
}
