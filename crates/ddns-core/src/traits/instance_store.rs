// # Instance Store Trait
//
// Defines the interface for tracking workflow instances started by the
// trigger endpoint, so callers can poll the outcome of a reconciliation.
//
// ## Purpose
//
// The provider is the only source of truth for DNS state. The instance
// store tracks nothing but the progress of in-flight and finished runs:
// - Status (pending, running, completed, failed)
// - Attempt count
// - The terminal result kind and error text
//
// ## Implementations
//
// - In-memory: `MemoryInstanceStore`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::{ReconciliationInput, ResultKind};
use crate::traits::RecordType;

/// Lifecycle status of a workflow instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// Accepted, not started yet
    Pending,
    /// Reconciliation in progress (possibly between retries)
    Running,
    /// Finished with created, updated or unchanged
    Completed,
    /// Finished with a failure outcome
    Failed,
}

impl InstanceStatus {
    /// Whether the instance has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstanceStatus::Completed | InstanceStatus::Failed)
    }
}

/// Tracking record for one workflow instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    /// Instance id
    pub id: String,
    /// Fully-qualified record name being reconciled
    pub full_name: String,
    /// Record type being reconciled
    pub record_type: RecordType,
    /// Desired value
    pub value: String,
    /// Current status
    pub status: InstanceStatus,
    /// Number of engine invocations so far
    pub attempts: u32,
    /// Terminal result kind, once known
    pub result: Option<ResultKind>,
    /// Error text of the last failed attempt
    pub error: Option<String>,
    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last status change
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl InstanceRecord {
    /// Create a pending record for `input`
    pub fn pending(id: impl Into<String>, input: &ReconciliationInput) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: id.into(),
            full_name: input.full_name(),
            record_type: input.record_type(),
            value: input.value().to_string(),
            status: InstanceStatus::Pending,
            attempts: 0,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `status`, refreshing `updated_at`
    pub fn transition(&mut self, status: InstanceStatus) {
        self.status = status;
        self.updated_at = chrono::Utc::now();
    }
}

/// Trait for instance store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks:
/// the trigger endpoint inserts while runners update and pollers read.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Insert a new instance
    ///
    /// # Errors
    ///
    /// Fails if an instance with the same id already exists.
    async fn create(&self, record: InstanceRecord) -> crate::Result<()>;

    /// Get an instance by id
    async fn get(&self, id: &str) -> crate::Result<Option<InstanceRecord>>;

    /// Replace the stored copy of an instance
    async fn save(&self, record: &InstanceRecord) -> crate::Result<()>;

    /// List all instance ids
    async fn list(&self) -> crate::Result<Vec<String>>;
}
