//! DNS Service Client
//!
//! Every request carries `X-Auth-Token` and `Accept: application/json`.
//! Path segments and the `name` query value are percent-encoded.
//!
//! | Operation     | Request                                      |
//! |---------------|----------------------------------------------|
//! | list zones    | `GET  {base}/v1/domains[?name=...]`          |
//! | list records  | `GET  {base}/v1/domains/{zone}/records`      |
//! | create record | `POST {base}/v1/domains/{zone}/records`      |
//! | update record | `PUT  {base}/v1/domains/{zone}/records/{id}` |

use async_trait::async_trait;
use ddns_core::traits::{DnsService, NewRecord, Record, RecordUpdate, Token, Zone};
use ddns_core::{Error, Result};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fmt;

use crate::http::{
    build_client, normalize_endpoint, send_expecting_success, send_json, AUTH_TOKEN_HEADER,
    DEFAULT_HTTP_TIMEOUT,
};

#[derive(Deserialize)]
struct ZonesResponse {
    #[serde(default)]
    domains: Vec<Zone>,
}

#[derive(Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<Record>,
}

/// The only field read from a create response
#[derive(Deserialize)]
struct CreatedRecord {
    id: String,
}

/// Client for the DNS service, bound to one endpoint and one token
#[derive(Clone)]
pub struct DnsClient {
    endpoint: String,
    /// ⚠️ NEVER log this value
    token: Token,
    client: reqwest::Client,
}

impl fmt::Debug for DnsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl DnsClient {
    /// Create a client with its own HTTP client and the default timeout
    pub fn new(endpoint: &str, token: Token) -> Result<Self> {
        Self::with_client(build_client(DEFAULT_HTTP_TIMEOUT)?, endpoint, token)
    }

    /// Create a client sharing an existing HTTP client
    ///
    /// # Errors
    ///
    /// `Error::Validation` if `endpoint` or `token` is empty.
    pub fn with_client(client: reqwest::Client, endpoint: &str, token: Token) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::validation("token is empty"));
        }
        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
            token,
            client,
        })
    }

    /// DNS service base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn records_url(&self, zone_id: &str) -> Result<String> {
        Ok(format!(
            "{}/v1/domains/{}/records",
            self.endpoint,
            urlencoding::encode(require("zone id", zone_id)?)
        ))
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorized(self.client.get(url))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTH_TOKEN_HEADER, self.token.as_str())
            .header(ACCEPT, "application/json")
    }
}

fn require<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::validation(format!("{} is empty", what)));
    }
    Ok(value)
}

#[async_trait]
impl DnsService for DnsClient {
    async fn list_zones(&self, name: Option<&str>) -> Result<Vec<Zone>> {
        let url = match name.filter(|n| !n.is_empty()) {
            Some(name) => format!("{}/v1/domains?name={}", self.endpoint, urlencoding::encode(name)),
            None => format!("{}/v1/domains", self.endpoint),
        };
        tracing::debug!(%url, "Listing zones");

        let response: ZonesResponse = send_json(self.get(&url)).await?;
        Ok(response.domains)
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        let url = self.records_url(zone_id)?;
        tracing::debug!(%url, "Listing records");

        let response: RecordsResponse = send_json(self.get(&url)).await?;
        Ok(response.records)
    }

    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<String> {
        let url = self.records_url(zone_id)?;
        tracing::debug!(%url, name = %record.name, record_type = %record.record_type, "Creating record");

        let created: CreatedRecord =
            send_json(self.authorized(self.client.post(&url)).json(record)).await?;
        Ok(created.id)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<()> {
        let url = format!(
            "{}/{}",
            self.records_url(zone_id)?,
            urlencoding::encode(require("record id", record_id)?)
        );
        tracing::debug!(%url, data = %update.data, "Updating record");

        send_expecting_success(self.authorized(self.client.put(&url)).json(update)).await
    }
}
