// # ddns-core
//
// Core library for the DDNS updater.
//
// ## Architecture Overview
//
// This library reconciles one DNS record at the provider with a desired
// address:
// - **IdentityService**: Trait for obtaining a token and service catalog
// - **DnsService**: Trait for zone/record listing and record writes
// - **ServiceFactory**: Builds both clients for each reconciliation
// - **Reconciler**: Create, update or no-op, decided from remote state only
// - **WorkflowRunner**: Retries transient failures and tracks instances
//
// ## Design Principles
//
// 1. **Provider is the source of truth**: No local persistent DNS state
// 2. **Sequential**: One strictly ordered chain of calls per reconciliation
// 3. **Idempotent**: Re-running converges to `Unchanged`
// 4. **Library-First**: The daemon is a thin trigger around this crate

pub mod traits;
pub mod engine;
pub mod workflow;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{DnsService, IdentityService, InstanceStore, ServiceFactory};
pub use engine::{ReconciliationInput, ReconciliationResult, Reconciler, ResultKind, Stage};
pub use workflow::{RetryPolicy, WorkflowEvent, WorkflowRunner};
pub use config::{DdnsConfig, ProviderConfig, RunnerConfig};
pub use error::{Error, Result};
pub use state::MemoryInstanceStore;
