//! Reconciliation engine
//!
//! The Reconciler is responsible for:
//! - Authenticating against the identity service
//! - Resolving the DNS endpoint from the service catalog
//! - Resolving the zone and the (name, type) record
//! - Performing the minimal write: create, update or nothing
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ ReconciliationInput│
//! └─────────┬──────────┘
//!           ▼
//!   ┌──────────────┐  authenticate   ┌─────────────────┐
//!   │  Reconciler  │────────────────▶│ IdentityService │
//!   └──────┬───────┘                 └─────────────────┘
//!          │ list_zones / list_records / create / update
//!          ▼
//!   ┌──────────────┐
//!   │  DnsService  │
//!   └──────────────┘
//! ```
//!
//! ## Stage Flow
//!
//! `Authenticating → CatalogResolving → ZoneResolving → RecordResolving →
//! {Unchanged | Creating | Updating}`. Any stage can fail; a failure is
//! terminal for the invocation. There is no internal retry and no
//! compensation: every remote call is idempotent at the data level, so a
//! later re-run converges to `Unchanged`.

pub mod input;

pub use input::{full_name, parse_ttl, ReconciliationInput, APEX_RECORD, DEFAULT_TTL};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::traits::{AuthSession, NewRecord, RecordUpdate, ServiceFactory};

/// Description written into every record this engine creates or updates
pub const MARKER_DESCRIPTION: &str = "Configured by ddnsd";

/// Catalog service type of the DNS API
pub const DNS_SERVICE_TYPE: &str = "dns";

/// Stage of one reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Calling the identity service
    Authenticating,
    /// Picking the DNS endpoint out of the catalog
    CatalogResolving,
    /// Looking up the zone by name
    ZoneResolving,
    /// Listing records of the zone
    RecordResolving,
    /// Creating a missing record
    Creating,
    /// Updating a record with stale data
    Updating,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Authenticating => "authenticating",
            Stage::CatalogResolving => "catalog-resolving",
            Stage::ZoneResolving => "zone-resolving",
            Stage::RecordResolving => "record-resolving",
            Stage::Creating => "creating",
            Stage::Updating => "updating",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of one reconciliation
#[derive(Debug)]
pub enum ReconciliationResult {
    /// The record did not exist and was created
    Created {
        /// Zone id
        zone_id: String,
        /// Id of the new record
        record_id: String,
    },
    /// The record existed with other data and was updated
    Updated {
        /// Zone id
        zone_id: String,
        /// Id of the updated record
        record_id: String,
    },
    /// The record already held the desired value; nothing was written
    Unchanged {
        /// Zone id
        zone_id: String,
        /// Id of the existing record
        record_id: String,
    },
    /// No zone matched the domain
    ZoneNotFound {
        /// The queried domain
        domain: String,
    },
    /// More than one zone matched the domain
    AmbiguousZone {
        /// The queried domain
        domain: String,
        /// Ids of every matching zone, in provider order
        zone_ids: Vec<String>,
    },
    /// The identity call failed
    AuthFailed(Error),
    /// A DNS call failed
    ApiError {
        /// Stage the failing call belongs to
        stage: Stage,
        /// The underlying error
        error: Error,
    },
}

/// Serializable label of a [`ReconciliationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultKind {
    Created,
    Updated,
    Unchanged,
    ZoneNotFound,
    AmbiguousZone,
    AuthFailed,
    ApiError,
}

impl ReconciliationResult {
    /// Label of this outcome
    pub fn kind(&self) -> ResultKind {
        match self {
            Self::Created { .. } => ResultKind::Created,
            Self::Updated { .. } => ResultKind::Updated,
            Self::Unchanged { .. } => ResultKind::Unchanged,
            Self::ZoneNotFound { .. } => ResultKind::ZoneNotFound,
            Self::AmbiguousZone { .. } => ResultKind::AmbiguousZone,
            Self::AuthFailed(_) => ResultKind::AuthFailed,
            Self::ApiError { .. } => ResultKind::ApiError,
        }
    }

    /// Whether the provider now holds the desired record
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Created { .. } | Self::Updated { .. } | Self::Unchanged { .. }
        )
    }

    /// Whether re-running the same reconciliation may produce a different outcome
    pub fn is_transient(&self) -> bool {
        match self {
            Self::AuthFailed(error) | Self::ApiError { error, .. } => error.is_transient(),
            _ => false,
        }
    }

    /// Human-readable failure description, `None` for successful outcomes
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::ZoneNotFound { domain } => Some(format!("zone {} not found", domain)),
            Self::AmbiguousZone { domain, zone_ids } => Some(format!(
                "zone {} is ambiguous: {} matches ({})",
                domain,
                zone_ids.len(),
                zone_ids.join(", ")
            )),
            Self::AuthFailed(error) => Some(error.to_string()),
            Self::ApiError { stage, error } => Some(format!("{} failed: {}", stage, error)),
            _ => None,
        }
    }
}

/// Core reconciliation engine
///
/// Stateless across invocations: each call to [`Reconciler::reconcile`]
/// authenticates anew, builds fresh clients and drops them when done.
/// Concurrent invocations for the same record are not coordinated; the
/// provider resolves races last-write-wins.
#[derive(Clone)]
pub struct Reconciler {
    factory: Arc<dyn ServiceFactory>,
}

impl Reconciler {
    /// Create a reconciler that builds its clients from `factory`
    pub fn new(factory: Arc<dyn ServiceFactory>) -> Self {
        Self { factory }
    }

    /// Make the remote record match `input`
    ///
    /// # Returns
    ///
    /// - `Ok(result)`: The terminal outcome, failures included
    /// - `Err(Error::Config)`: The catalog has no usable DNS endpoint, or
    ///   the DNS client could not be built. Not retryable.
    pub async fn reconcile(&self, input: &ReconciliationInput) -> Result<ReconciliationResult> {
        let domain = input.domain();
        let full_name = input.full_name();
        let record_type = input.record_type();
        let value = input.value().to_string();

        debug!(stage = %Stage::Authenticating, %domain, "Reconciliation started");
        let session = match self.authenticate(input).await {
            Ok(session) => session,
            Err(e) => {
                error!(stage = %Stage::Authenticating, %domain, error = %e, "Could not obtain an access token");
                return Ok(ReconciliationResult::AuthFailed(e));
            }
        };

        debug!(stage = %Stage::CatalogResolving, %domain, "Resolving DNS endpoint");
        let dns_endpoint = session.endpoint_for(DNS_SERVICE_TYPE).ok_or_else(|| {
            Error::config(format!(
                "service catalog has no '{}' entry with an endpoint",
                DNS_SERVICE_TYPE
            ))
        })?;
        let dns = self.factory.dns(dns_endpoint, &session.token)?;

        debug!(stage = %Stage::ZoneResolving, %domain, "Looking up zone");
        let zones = match dns.list_zones(Some(domain)).await {
            Ok(zones) => zones,
            Err(e) => return Ok(api_failure(Stage::ZoneResolving, domain, e)),
        };
        let zone_id = match zones.as_slice() {
            [] => {
                error!(%domain, "Zone not found");
                return Ok(ReconciliationResult::ZoneNotFound {
                    domain: domain.to_string(),
                });
            }
            [zone] => zone.id.clone(),
            _ => {
                let zone_ids: Vec<String> = zones.iter().map(|z| z.id.clone()).collect();
                error!(%domain, ?zones, "Multiple zones matched");
                return Ok(ReconciliationResult::AmbiguousZone {
                    domain: domain.to_string(),
                    zone_ids,
                });
            }
        };

        debug!(stage = %Stage::RecordResolving, %domain, %zone_id, "Listing records");
        let records = match dns.list_records(&zone_id).await {
            Ok(records) => records,
            Err(e) => return Ok(api_failure(Stage::RecordResolving, domain, e)),
        };

        // First match in provider order wins; further duplicates are left alone.
        let mut matching = records
            .iter()
            .filter(|r| r.name == full_name && r.record_type == record_type.as_str());
        let existing = matching.next();
        let duplicates = matching.count();
        if duplicates > 0 {
            warn!(
                record = %full_name,
                %record_type,
                duplicates,
                "Multiple records share this name and type, using the first"
            );
        }

        match existing {
            Some(record) if record.data == value => {
                info!(record_id = %record.id, %value, "Record already has the desired value");
                Ok(ReconciliationResult::Unchanged {
                    zone_id,
                    record_id: record.id.clone(),
                })
            }
            Some(record) => {
                info!(record_id = %record.id, %value, previous = %record.data, "Updating record");
                let update = RecordUpdate {
                    data: value,
                    ttl: input.ttl(),
                    description: MARKER_DESCRIPTION.to_string(),
                };
                match dns.update_record(&zone_id, &record.id, &update).await {
                    Ok(()) => Ok(ReconciliationResult::Updated {
                        zone_id,
                        record_id: record.id.clone(),
                    }),
                    Err(e) => Ok(api_failure(Stage::Updating, domain, e)),
                }
            }
            None => {
                info!(
                    record = %full_name,
                    ttl = input.ttl(),
                    %record_type,
                    %value,
                    "Creating record"
                );
                let new_record = NewRecord {
                    name: full_name,
                    record_type: record_type.as_str().to_string(),
                    data: value,
                    ttl: input.ttl(),
                    description: MARKER_DESCRIPTION.to_string(),
                };
                match dns.create_record(&zone_id, &new_record).await {
                    Ok(record_id) => Ok(ReconciliationResult::Created { zone_id, record_id }),
                    Err(e) => Ok(api_failure(Stage::Creating, domain, e)),
                }
            }
        }
    }

    async fn authenticate(&self, input: &ReconciliationInput) -> Result<AuthSession> {
        let identity = self.factory.identity(input.identity_endpoint())?;
        let session = identity.authenticate(input.credentials()).await?;
        if session.token.is_empty() {
            return Err(Error::auth("identity service returned an empty token"));
        }
        Ok(session)
    }
}

fn api_failure(stage: Stage, domain: &str, error: Error) -> ReconciliationResult {
    error!(%stage, %domain, error = %error, "DNS service call failed");
    ReconciliationResult::ApiError { stage, error }
}
