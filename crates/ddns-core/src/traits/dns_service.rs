// # DNS Service Trait
//
// Defines the interface for listing zones and records and writing records
// through the provider's DNS API.
//
// ## Implementations
//
// - ConoHa DNS (`/v1/domains`): `ddns-provider-conoha` crate
//
// Only the fields the engine consumes are modeled. Provider documents may
// carry more; implementations ignore anything not listed here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::identity::Token;

/// A DNS zone at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider zone id
    pub id: String,
    /// Zone (domain) name
    pub name: String,
}

/// A DNS resource record at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Provider record id
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type ("A", "AAAA", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value
    pub data: String,
    /// Time-to-live, when the provider reports one
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Address record type managed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Record type for the address family of `ip`
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire label of this record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a record creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    /// Fully-qualified record name
    pub name: String,
    /// Record type label
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value
    pub data: String,
    /// Time-to-live
    pub ttl: u32,
    /// Marker description
    pub description: String,
}

/// Body of a record update request; name and type are never changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    /// New record value
    pub data: String,
    /// Time-to-live
    pub ttl: u32,
    /// Marker description
    pub description: String,
}

/// Trait for DNS service clients
///
/// All four operations decode errors the same way: a non-success response
/// with JSON content is `Error::Api(raw_body)`, any other non-success
/// response is `Error::Transport { status }`.
///
/// # Trust Level: Untrusted
///
/// Implementations perform exactly one HTTP call per method, keep no state
/// beyond the endpoint and token they were built with, and never retry.
#[async_trait]
pub trait DnsService: Send + Sync {
    /// List zones, optionally filtered by exact name
    async fn list_zones(&self, name: Option<&str>) -> crate::Result<Vec<Zone>>;

    /// List all records of a zone, in provider order
    async fn list_records(&self, zone_id: &str) -> crate::Result<Vec<Record>>;

    /// Create a record in a zone
    ///
    /// # Returns
    ///
    /// The id the provider assigned to the new record
    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> crate::Result<String>;

    /// Update an existing record
    ///
    /// The response document is not inspected; a success status is enough.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> crate::Result<()>;
}

/// Builds the service clients the engine needs for one reconciliation
///
/// The identity endpoint comes from the reconciliation input and the DNS
/// endpoint from the catalog, so both clients are created per invocation.
pub trait ServiceFactory: Send + Sync {
    /// Create an identity client for `endpoint`
    fn identity(&self, endpoint: &str) -> crate::Result<Box<dyn super::IdentityService>>;

    /// Create a DNS client for `endpoint` authenticated with `token`
    fn dns(&self, endpoint: &str, token: &Token) -> crate::Result<Box<dyn DnsService>>;
}
