// # Identity Service Trait
//
// Defines the interface for authenticating against the provider's identity
// service. A successful call yields a bearer token and the service catalog,
// which is how the engine discovers the DNS endpoint.
//
// ## Implementations
//
// - ConoHa (Keystone v2 style): `ddns-provider-conoha` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{Credentials, IdentityService};
//
// let session = identity.authenticate(&credentials).await?;
// let dns_url = session.endpoint_for("dns");
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Credentials used for a single authentication call
///
/// The Debug implementation never exposes the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// API user name
    pub username: String,
    /// API password
    /// ⚠️ NEVER log this value
    pub password: String,
    /// Tenant identifier (omitted from the request when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Credentials {
    /// Create a new set of credentials
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        tenant_id: Option<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            tenant_id,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Opaque bearer token, valid for the duration of one reconciliation
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token, for the `X-Auth-Token` header only
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<REDACTED>)")
    }
}

/// One service catalog entry: a service type and its public endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Service type label (e.g. "dns", "compute")
    pub service_type: String,
    /// Public URLs, in provider order
    pub public_urls: Vec<String>,
}

/// Result of a successful authentication
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Bearer token
    pub token: Token,
    /// Service catalog
    pub catalog: Vec<CatalogEntry>,
}

impl AuthSession {
    /// Public URL of the first endpoint of the first catalog entry of `service_type`
    ///
    /// Returns `None` when no entry of that type exists or it lists no endpoint.
    pub fn endpoint_for(&self, service_type: &str) -> Option<&str> {
        self.catalog
            .iter()
            .find(|entry| entry.service_type == service_type)
            .and_then(|entry| entry.public_urls.first())
            .map(String::as_str)
    }
}

/// Trait for identity service clients
///
/// Implementations issue exactly one authentication request per call and
/// never retry internally; retry is owned by the workflow runner.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Authenticate and return the token plus service catalog
    ///
    /// # Errors
    ///
    /// - `Error::Api(body)` when the provider answers with a JSON error document
    /// - `Error::Transport { status }` for any other non-success response
    /// - `Error::Http` when no response was received
    async fn authenticate(&self, credentials: &Credentials) -> crate::Result<AuthSession>;
}
