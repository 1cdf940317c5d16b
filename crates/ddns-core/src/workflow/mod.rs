//! Workflow runner
//!
//! Wraps the [`Reconciler`] in an at-least-once retry loop and tracks each
//! run as an instance in an [`InstanceStore`].
//!
//! ## Event Flow
//!
//! 1. Trigger validates input and calls [`WorkflowRunner::start`] (instance is `pending`)
//! 2. [`WorkflowRunner::run`] marks it `running` and invokes the engine
//! 3. Transient failures are retried after the configured delay
//! 4. The instance ends `completed` or `failed`; an event is emitted for each step
//!
//! Re-running the engine is always safe: a record that already holds the
//! desired value yields `Unchanged` without a write.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::RunnerConfig;
use crate::engine::{ReconciliationInput, Reconciler, ResultKind};
use crate::error::{Error, Result};
use crate::traits::{InstanceRecord, InstanceStatus, InstanceStore};

/// Events emitted by the WorkflowRunner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Instance moved to running
    Started {
        instance_id: String,
        full_name: String,
    },

    /// One engine invocation ended in a failure
    AttemptFailed {
        instance_id: String,
        attempt: u32,
        error: String,
        will_retry: bool,
    },

    /// Instance finished with created, updated or unchanged
    Completed {
        instance_id: String,
        result: ResultKind,
        attempts: u32,
    },

    /// Instance finished with a failure
    Failed {
        instance_id: String,
        result: Option<ResultKind>,
        error: String,
        attempts: u32,
    },
}

/// How often and how fast to re-run a transiently failed reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first
    pub max_retries: usize,
    /// Delay between attempts
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
        }
    }
}

impl From<&RunnerConfig> for RetryPolicy {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// Retrying, instance-tracking host for the reconciliation engine
///
/// Cheap to clone; clones share the reconciler, the store and the event channel.
#[derive(Clone)]
pub struct WorkflowRunner {
    reconciler: Reconciler,
    store: Arc<dyn InstanceStore>,
    policy: RetryPolicy,
    event_tx: Option<mpsc::Sender<WorkflowEvent>>,
}

impl WorkflowRunner {
    /// Create a runner without an event channel
    pub fn new(reconciler: Reconciler, store: Arc<dyn InstanceStore>, policy: RetryPolicy) -> Self {
        Self {
            reconciler,
            store,
            policy,
            event_tx: None,
        }
    }

    /// Attach a bounded event channel
    ///
    /// When the channel is full, events are dropped with a warning.
    pub fn with_events(mut self, capacity: usize) -> (Self, mpsc::Receiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.event_tx = Some(tx);
        (self, rx)
    }

    /// The instance store this runner writes to
    pub fn store(&self) -> &Arc<dyn InstanceStore> {
        &self.store
    }

    /// Register a pending instance for `input`
    pub async fn start(&self, instance_id: &str, input: &ReconciliationInput) -> Result<InstanceRecord> {
        let record = InstanceRecord::pending(instance_id, input);
        self.store.create(record.clone()).await?;
        info!(
            instance_id,
            record = %record.full_name,
            record_type = %record.record_type,
            value = %record.value,
            "Workflow instance accepted"
        );
        Ok(record)
    }

    /// Run a previously started instance to completion
    ///
    /// # Returns
    ///
    /// The final instance record. `Err` only for instance store failures or
    /// an unknown instance id; reconciliation failures end up in the record.
    pub async fn run(&self, instance_id: &str, input: &ReconciliationInput) -> Result<InstanceRecord> {
        let mut record = self
            .store
            .get(instance_id)
            .await?
            .ok_or_else(|| Error::Other(format!("unknown instance {}", instance_id)))?;

        record.transition(InstanceStatus::Running);
        self.store.save(&record).await?;
        self.emit_event(WorkflowEvent::Started {
            instance_id: instance_id.to_string(),
            full_name: record.full_name.clone(),
        });

        let mut retries = 0;
        loop {
            record.attempts += 1;

            match self.reconciler.reconcile(input).await {
                Ok(result) if result.is_success() => {
                    info!(instance_id, result = ?result.kind(), attempts = record.attempts, "Workflow instance completed");
                    record.result = Some(result.kind());
                    record.error = None;
                    record.transition(InstanceStatus::Completed);
                    self.store.save(&record).await?;
                    self.emit_event(WorkflowEvent::Completed {
                        instance_id: instance_id.to_string(),
                        result: result.kind(),
                        attempts: record.attempts,
                    });
                    return Ok(record);
                }
                Ok(result) => {
                    let message = result.failure_message().unwrap_or_default();
                    let will_retry = result.is_transient() && retries < self.policy.max_retries;

                    record.result = Some(result.kind());
                    record.error = Some(message.clone());
                    self.emit_event(WorkflowEvent::AttemptFailed {
                        instance_id: instance_id.to_string(),
                        attempt: record.attempts,
                        error: message.clone(),
                        will_retry,
                    });

                    if will_retry {
                        warn!(instance_id, attempt = record.attempts, error = %message, "Attempt failed, retrying");
                        self.store.save(&record).await?;
                        tokio::time::sleep(self.policy.retry_delay).await;
                        retries += 1;
                        continue;
                    }

                    return self.fail(record, Some(result.kind()), message).await;
                }
                Err(e) => {
                    // Fatal: configuration problems do not heal on retry.
                    error!(instance_id, error = %e, "Reconciliation aborted");
                    let message = e.to_string();
                    self.emit_event(WorkflowEvent::AttemptFailed {
                        instance_id: instance_id.to_string(),
                        attempt: record.attempts,
                        error: message.clone(),
                        will_retry: false,
                    });
                    return self.fail(record, None, message).await;
                }
            }
        }
    }

    async fn fail(
        &self,
        mut record: InstanceRecord,
        result: Option<ResultKind>,
        message: String,
    ) -> Result<InstanceRecord> {
        // Already logged at error level by the engine or the fatal branch above.
        debug!(instance_id = %record.id, attempts = record.attempts, error = %message, "Workflow instance failed");
        record.result = result;
        record.error = Some(message.clone());
        record.transition(InstanceStatus::Failed);
        self.store.save(&record).await?;
        self.emit_event(WorkflowEvent::Failed {
            instance_id: record.id.clone(),
            result,
            error: message,
            attempts: record.attempts,
        });
        Ok(record)
    }

    fn emit_event(&self, event: WorkflowEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };
        debug!(?event, "Workflow event");
        if tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing the event channel capacity.");
        }
    }
}
