//! Shared HTTP plumbing for the identity and DNS clients
//!
//! Both APIs follow the same error convention:
//! - non-success + `application/json` content ⇒ [`Error::Api`] with the raw body
//! - non-success otherwise ⇒ [`Error::Transport`] with the status code

use ddns_core::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the bearer token on DNS requests
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Build an HTTP client with the given per-request timeout
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// Endpoint with any trailing slashes removed, rejecting empty input
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::validation("endpoint is empty"));
    }
    Ok(trimmed.to_string())
}

/// Whether a Content-Type value names `application/json` (parameters ignored)
pub fn is_json_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Send a request and decode the JSON document of a successful response
pub async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response).await);
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

    Ok(serde_json::from_str(&body)?)
}

/// Send a request and only check that it succeeded
///
/// The response body of a successful call is discarded unread.
pub async fn send_expecting_success(request: reqwest::RequestBuilder) -> Result<()> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(())
}

/// Convert a non-success response into an error per the API convention
async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_content_type);

    if !json {
        tracing::debug!(status = status.as_u16(), "Non-JSON error response");
        return Error::transport(status.as_u16());
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!(status = status.as_u16(), "Provider returned an error document");
            Error::api(body)
        }
        Err(e) => Error::http(format!("Failed to read error response ({}): {}", status, e)),
    }
}
