//! Reconciliation input and its validation
//!
//! Everything here runs before the first network call. Missing or malformed
//! fields are rejected with [`Error::Validation`]; the ttl is the single
//! field that silently falls back to a default.

use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::traits::{Credentials, RecordType};

/// Record name that addresses the zone apex
pub const APEX_RECORD: &str = "@";

/// Ttl used when no override is configured or the override is unparsable
pub const DEFAULT_TTL: u32 = 300;

/// Fully-qualified name of `record` within `domain`
///
/// ```
/// use ddns_core::engine::full_name;
///
/// assert_eq!(full_name("example.com", "@"), "example.com");
/// assert_eq!(full_name("example.com", "www"), "www.example.com");
/// ```
pub fn full_name(domain: &str, record: &str) -> String {
    if record == APEX_RECORD {
        domain.to_string()
    } else {
        format!("{}.{}", record, domain)
    }
}

/// Effective ttl for a raw override value
///
/// Absent, empty, negative or non-numeric input yields [`DEFAULT_TTL`].
pub fn parse_ttl(raw: Option<&str>) -> u32 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_TTL)
}

/// Everything one reconciliation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationInput {
    domain: String,
    record: String,
    value: IpAddr,
    ttl: u32,
    identity_endpoint: String,
    credentials: Credentials,
}

impl ReconciliationInput {
    /// Validate and build an input
    ///
    /// # Parameters
    ///
    /// - `domain`: Zone name (e.g. "example.com"); surrounding whitespace is trimmed
    /// - `record`: Record label, or "@" for the apex
    /// - `value`: Desired address; its family decides between A and AAAA
    /// - `ttl`: Effective ttl (see [`parse_ttl`])
    /// - `identity_endpoint`: Identity service base URL
    /// - `credentials`: API credentials
    ///
    /// # Errors
    ///
    /// `Error::Validation` if a required field is empty or `value` is not an
    /// IPv4/IPv6 address.
    pub fn new(
        domain: impl Into<String>,
        record: impl Into<String>,
        value: &str,
        ttl: u32,
        identity_endpoint: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self> {
        let domain = domain.into().trim().to_string();
        let record = record.into().trim().to_string();
        let identity_endpoint = identity_endpoint.into().trim().to_string();

        if domain.is_empty() {
            return Err(Error::validation("domain is not specified"));
        }
        if record.is_empty() {
            return Err(Error::validation("record is not specified"));
        }
        if identity_endpoint.is_empty() {
            return Err(Error::validation("identity endpoint is not configured"));
        }
        if credentials.username.is_empty() {
            return Err(Error::validation("username is not configured"));
        }
        if credentials.password.is_empty() {
            return Err(Error::validation("password is not configured"));
        }

        let value: IpAddr = value
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("value is not an IP address: {}", value)))?;

        Ok(Self {
            domain,
            record,
            value,
            ttl,
            identity_endpoint,
            credentials,
        })
    }

    /// Zone name
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Record label as supplied ("@" for the apex)
    pub fn record(&self) -> &str {
        &self.record
    }

    /// Fully-qualified record name
    pub fn full_name(&self) -> String {
        full_name(&self.domain, &self.record)
    }

    /// Desired address
    pub fn value(&self) -> IpAddr {
        self.value
    }

    /// Record type derived from the desired address
    pub fn record_type(&self) -> RecordType {
        RecordType::for_ip(&self.value)
    }

    /// Effective ttl
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Identity service base URL
    pub fn identity_endpoint(&self) -> &str {
        &self.identity_endpoint
    }

    /// API credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}
