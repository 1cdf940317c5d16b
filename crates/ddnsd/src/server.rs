//! HTTP trigger server
//!
//! | Route                    | Purpose                                       |
//! |--------------------------|-----------------------------------------------|
//! | `POST /api/UpdateRecord` | validate, start a workflow instance, 202      |
//! | `GET  /api/status/:id`   | instance record as JSON, 404 when unknown     |
//! | `GET  /api/GetIpAddress` | the caller's address as plain text            |
//!
//! `UpdateRecord` reads `domain`, `record` and `value` from a urlencoded form
//! body and falls back to the query string. Within one source the last
//! non-empty occurrence wins.

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ddns_core::traits::InstanceStore;
use ddns_core::{DdnsConfig, WorkflowRunner};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub runner: WorkflowRunner,
    pub config: Arc<DdnsConfig>,
}

/// Body of the 202 response to a trigger request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Accepted {
    id: String,
    status_query_get_uri: String,
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/UpdateRecord", post(update_record))
        .route("/api/status/:id", get(instance_status))
        .route("/api/GetIpAddress", get(get_ip_address))
        .with_state(state)
}

/// Trigger parameters gathered from the form body and the query string
#[derive(Debug, Default, PartialEq, Eq)]
struct TriggerParams {
    domain: Option<String>,
    record: Option<String>,
    value: Option<String>,
}

impl TriggerParams {
    fn extract(headers: &HeaderMap, query: Option<&str>, body: &[u8]) -> Self {
        let form = if has_form_content_type(headers) {
            parse_pairs(body)
        } else {
            Vec::new()
        };
        let query = parse_pairs(query.unwrap_or_default().as_bytes());

        let param = |name: &str| last_non_empty(&form, name).or_else(|| last_non_empty(&query, name));

        Self {
            domain: param("domain"),
            record: param("record"),
            value: param("value"),
        }
    }
}

fn has_form_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn parse_pairs(input: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(input).into_owned().collect()
}

fn last_non_empty(pairs: &[(String, String)], name: &str) -> Option<String> {
    pairs
        .iter()
        .rev()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.clone())
}

/// Caller address, with IPv4-mapped IPv6 addresses shown as IPv4
fn remote_ip(remote: SocketAddr) -> IpAddr {
    remote.ip().to_canonical()
}

fn status_uri(headers: &HeaderMap, id: &str) -> String {
    let path = format!("/api/status/{}", id);
    match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, path),
        None => path,
    }
}

async fn update_record(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let params = TriggerParams::extract(&headers, query.as_deref(), &body);

    let Some(domain) = params.domain else {
        return (StatusCode::BAD_REQUEST, "domain is not specified").into_response();
    };
    let Some(record) = params.record else {
        return (StatusCode::BAD_REQUEST, "record is not specified").into_response();
    };
    let value = params
        .value
        .unwrap_or_else(|| remote_ip(remote).to_string());

    let input = match state.config.input_for(&domain, &record, &value) {
        Ok(input) => input,
        Err(e) => {
            warn!(%domain, %record, %value, error = %e, "Rejected trigger request");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let id = uuid::Uuid::new_v4().simple().to_string();
    if let Err(e) = state.runner.start(&id, &input).await {
        error!(instance_id = %id, error = %e, "Failed to register workflow instance");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    let runner = state.runner.clone();
    let instance_id = id.clone();
    tokio::spawn(async move {
        if let Err(e) = runner.run(&instance_id, &input).await {
            error!(%instance_id, error = %e, "Workflow instance aborted");
        }
    });

    let uri = status_uri(&headers, &id);
    info!(instance_id = %id, %domain, %record, %value, "Started workflow instance");
    (
        StatusCode::ACCEPTED,
        [(header::LOCATION, uri.clone())],
        Json(Accepted {
            id,
            status_query_get_uri: uri,
        }),
    )
        .into_response()
}

async fn instance_status(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.runner.store().get(&id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "instance not found").into_response(),
        Err(e) => {
            error!(instance_id = %id, error = %e, "Failed to read workflow instance");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn get_ip_address(ConnectInfo(remote): ConnectInfo<SocketAddr>) -> String {
    remote_ip(remote).to_string()
}
