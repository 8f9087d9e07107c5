use crate::application::ports::remote_store::RemoteError;
use crate::application::ports::{OperationQueueStore, RemoteStore};
use crate::application::services::connectivity::ConnectivityMonitor;
use crate::domain::entities::{DrainReport, DrainTrigger, QueuedOperation, SyncStatusSnapshot};
use crate::domain::value_objects::{OperationKind, QueueStatus};
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use crate::shared::metrics::{DrainMetrics, DrainMetricsSnapshot};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct DrainState {
    in_progress: bool,
    last_attempt: Option<chrono::DateTime<Utc>>,
    last_error: Option<String>,
}

/// Drains the operation queue against the remote store. One drain cycle runs
/// at a time; triggers arriving while a cycle is in progress are dropped, not
/// queued. Per-operation failures are recorded and the cycle continues, so a
/// single bad record never stalls the rest of the batch.
pub struct SyncService {
    queue: Arc<dyn OperationQueueStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<ConnectivityMonitor>,
    config: SyncConfig,
    state: RwLock<DrainState>,
    metrics: DrainMetrics,
}

impl SyncService {
    pub fn new(
        queue: Arc<dyn OperationQueueStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<ConnectivityMonitor>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            remote,
            connectivity,
            config,
            state: RwLock::new(DrainState {
                in_progress: false,
                last_attempt: None,
                last_error: None,
            }),
            metrics: DrainMetrics::new(),
        }
    }

    /// UI-facing "force sync now".
    pub async fn force_sync_now(&self) -> Result<DrainReport, AppError> {
        self.drain(DrainTrigger::Manual).await
    }

    pub async fn drain(&self, trigger: DrainTrigger) -> Result<DrainReport, AppError> {
        if !self.connectivity.is_online() {
            debug!(
                target: "sync::drain",
                trigger = %trigger,
                "offline, drain not attempted"
            );
            return Ok(DrainReport::skipped(trigger));
        }

        {
            let mut state = self.state.write().await;
            if state.in_progress {
                debug!(
                    target: "sync::drain",
                    trigger = %trigger,
                    "drain already in progress, trigger dropped"
                );
                return Ok(DrainReport::skipped(trigger));
            }
            state.in_progress = true;
        }

        let outcome = self.run_cycle(trigger).await;

        let mut state = self.state.write().await;
        state.in_progress = false;
        state.last_attempt = Some(Utc::now());
        match outcome {
            Ok((report, last_error)) => {
                if report.fully_synced() {
                    self.metrics.record_success();
                    state.last_error = None;
                } else {
                    self.metrics.record_failure();
                    state.last_error = last_error;
                }
                Ok(report)
            }
            Err(err) => {
                // Only local storage failures land here; remote failures are
                // absorbed per operation.
                self.metrics.record_failure();
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_cycle(
        &self,
        trigger: DrainTrigger,
    ) -> Result<(DrainReport, Option<String>), AppError> {
        // Snapshot of the pending set; operations enqueued mid-drain wait
        // for the next cycle so a busy writer cannot produce an unbounded
        // drain.
        let pending = self.queue.list_pending().await?;

        info!(
            target: "sync::drain",
            trigger = %trigger,
            pending = pending.len(),
            "drain cycle started"
        );

        let mut synced = 0u32;
        let mut failed = 0u32;
        let mut last_error = None;

        for operation in &pending {
            match self.apply(operation).await {
                Ok(()) => {
                    self.queue.mark_synced(&operation.operation_id).await?;
                    synced += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    let status = self
                        .queue
                        .mark_failed(&operation.operation_id, &message, self.config.max_retry)
                        .await?;
                    failed += 1;
                    last_error = Some(message.clone());

                    if status == QueueStatus::Failed {
                        warn!(
                            target: "sync::drain",
                            operation = %operation.operation_id,
                            table = %operation.table,
                            record = %operation.record_id,
                            error = %message,
                            "operation exhausted its retry budget, manual intervention required"
                        );
                    } else if err.is_retryable() {
                        debug!(
                            target: "sync::drain",
                            operation = %operation.operation_id,
                            retry_count = operation.retry_count + 1,
                            error = %message,
                            "operation failed, will retry next cycle"
                        );
                    } else {
                        warn!(
                            target: "sync::drain",
                            operation = %operation.operation_id,
                            error = %message,
                            "operation rejected by the backend"
                        );
                    }
                }
            }
        }

        let report = DrainReport::completed(trigger, pending.len() as u32, synced, failed);
        info!(
            target: "sync::drain",
            trigger = %trigger,
            attempted = report.attempted,
            synced = report.synced,
            failed = report.failed,
            "drain cycle finished"
        );

        Ok((report, last_error))
    }

    async fn apply(&self, operation: &QueuedOperation) -> Result<(), RemoteError> {
        match operation.kind {
            OperationKind::Create | OperationKind::Update => self
                .remote
                .upsert(operation.table, operation.payload.as_json().clone())
                .await
                .map(|_| ()),
            OperationKind::Delete => {
                self.remote
                    .delete_row(operation.table, &operation.record_id)
                    .await
            }
        }
    }

    /// UI-facing status snapshot, recomputed from the queue on every call.
    pub async fn status(&self) -> Result<SyncStatusSnapshot, AppError> {
        let unsynced = self.queue.count_pending().await?;
        let failed = self.queue.count_failed().await?;
        let state = self.state.read().await;

        Ok(SyncStatusSnapshot {
            unsynced,
            failed,
            in_progress: state.in_progress,
            last_attempt: state.last_attempt,
            last_error: state.last_error.clone(),
        })
    }

    /// Removes every queue entry regardless of state. Manual recovery only;
    /// unsynced mutations are lost.
    pub async fn clear_queue(&self) -> Result<u64, AppError> {
        let removed = self.queue.clear().await?;
        warn!(target: "sync::drain", removed, "operation queue cleared");
        Ok(removed)
    }

    /// Drops terminal failures so they stop showing up in the failed count.
    pub async fn clear_failed(&self) -> Result<u64, AppError> {
        let removed = self.queue.clear_failed().await?;
        info!(target: "sync::drain", removed, "failed operations cleared");
        Ok(removed)
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn metrics_snapshot(&self) -> DrainMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Fire-and-forget drain request, used for the opportunistic flush after
    /// a local write.
    pub fn request_drain(self: &Arc<Self>, trigger: DrainTrigger) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = service.drain(trigger).await {
                error!(target: "sync::drain", error = %err, "requested drain failed");
            }
        });
    }

    /// Fixed-interval drain while online.
    pub fn spawn_interval_drain(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        let interval_secs = self.config.sync_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                if !service.is_online() {
                    continue;
                }
                if let Err(err) = service.drain(DrainTrigger::Interval).await {
                    error!(target: "sync::drain", error = %err, "interval drain failed");
                }
            }
        })
    }

    /// Full drain on every offline -> online transition.
    pub fn spawn_reconnect_drain(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        let mut receiver = self.connectivity.subscribe();
        tokio::spawn(async move {
            loop {
                if receiver.changed().await.is_err() {
                    break;
                }
                let online = *receiver.borrow_and_update();
                if !online {
                    continue;
                }
                if let Err(err) = service.drain(DrainTrigger::Reconnect).await {
                    error!(target: "sync::drain", error = %err, "reconnect drain failed");
                }
            }
        })
    }
}
