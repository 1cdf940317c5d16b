//! Identity Client
//!
//! ```http
//! POST {endpoint}/tokens
//! Accept: application/json
//! Content-Type: application/json
//!
//! {"auth":{"passwordCredentials":{"username":"...","password":"..."},"tenantId":"..."}}
//! ```
//!
//! Only `access.token.id` and `access.serviceCatalog[].{type,endpoints[].publicURL}`
//! are read from the response.

use async_trait::async_trait;
use ddns_core::traits::{AuthSession, CatalogEntry, Credentials, IdentityService, Token};
use ddns_core::Result;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, normalize_endpoint, send_json, DEFAULT_HTTP_TIMEOUT};

#[derive(Serialize)]
struct TokensRequest<'a> {
    auth: AuthBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthBody<'a> {
    password_credentials: PasswordCredentials<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokensResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: TokenDocument,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogDocument>,
}

#[derive(Deserialize)]
struct TokenDocument {
    id: String,
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<EndpointDocument>,
}

#[derive(Deserialize)]
struct EndpointDocument {
    #[serde(rename = "publicURL")]
    public_url: Option<String>,
}

impl From<CatalogDocument> for CatalogEntry {
    fn from(doc: CatalogDocument) -> Self {
        CatalogEntry {
            service_type: doc.service_type,
            public_urls: doc.endpoints.into_iter().filter_map(|e| e.public_url).collect(),
        }
    }
}

/// Client for the identity service's token endpoint
#[derive(Debug, Clone)]
pub struct IdentityClient {
    endpoint: String,
    client: reqwest::Client,
}

impl IdentityClient {
    /// Create a client with its own HTTP client and the default timeout
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_client(build_client(DEFAULT_HTTP_TIMEOUT)?, endpoint)
    }

    /// Create a client sharing an existing HTTP client
    ///
    /// # Errors
    ///
    /// `Error::Validation` if `endpoint` is empty.
    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
            client,
        })
    }

    /// Identity service base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession> {
        let url = format!("{}/tokens", self.endpoint);
        tracing::debug!(%url, username = %credentials.username, "Requesting access token");

        let body = TokensRequest {
            auth: AuthBody {
                password_credentials: PasswordCredentials {
                    username: &credentials.username,
                    password: &credentials.password,
                },
                tenant_id: credentials.tenant_id.as_deref(),
            },
        };

        let response: TokensResponse = send_json(
            self.client
                .post(&url)
                .header(ACCEPT, "application/json")
                .json(&body),
        )
        .await?;

        let catalog: Vec<CatalogEntry> = response
            .access
            .service_catalog
            .into_iter()
            .map(CatalogEntry::from)
            .collect();

        tracing::debug!(services = catalog.len(), "Access token obtained");
        Ok(AuthSession {
            token: Token::new(response.access.token.id),
            catalog,
        })
    }
}
