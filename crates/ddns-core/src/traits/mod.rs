//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces the engine and runner talk through.
//!
//! - [`IdentityService`]: Authenticate and fetch the service catalog
//! - [`DnsService`]: List zones/records and write records
//! - [`ServiceFactory`]: Build both clients per reconciliation
//! - [`InstanceStore`]: Track workflow instances

pub mod identity;
pub mod dns_service;
pub mod instance_store;

pub use identity::{AuthSession, CatalogEntry, Credentials, IdentityService, Token};
pub use dns_service::{DnsService, NewRecord, Record, RecordType, RecordUpdate, ServiceFactory, Zone};
pub use instance_store::{InstanceRecord, InstanceStatus, InstanceStore};
