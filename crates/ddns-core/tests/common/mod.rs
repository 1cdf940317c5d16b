//! Test doubles and common utilities for engine contract tests
//!
//! The fake provider keeps zones and records in memory, applies writes to
//! them, and records every call so tests can assert exact call counts.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    AuthSession, CatalogEntry, Credentials, DnsService, IdentityService, NewRecord, Record,
    RecordUpdate, ServiceFactory, Token, Zone,
};
use ddns_core::ReconciliationInput;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DNS_ENDPOINT: &str = "https://dns.example/";
pub const IDENTITY_ENDPOINT: &str = "https://identity.example/v2.0";
pub const TOKEN: &str = "token-abc";

type ErrorFn = Box<dyn Fn() -> Error + Send + Sync>;

#[derive(Default)]
struct ProviderState {
    zones: Vec<Zone>,
    records: Vec<Record>,
    catalog: Vec<CatalogEntry>,
    auth_failure: Option<ErrorFn>,
    zone_failures_remaining: usize,
    zone_failure: Option<ErrorFn>,
    record_listing_failure: Option<ErrorFn>,
    create_failure: Option<ErrorFn>,
    update_failure: Option<ErrorFn>,
    next_record_id: usize,
    created: Vec<(String, NewRecord)>,
    updated: Vec<(String, String, RecordUpdate)>,
    dns_tokens: Vec<String>,
}

/// In-memory provider with call counters
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<ProviderState>>,
    auth_calls: Arc<AtomicUsize>,
    list_zones_calls: Arc<AtomicUsize>,
    list_records_calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    /// Provider with a DNS catalog entry and no zones
    pub fn new() -> Self {
        let provider = Self::default();
        provider.state.lock().unwrap().catalog = vec![
            CatalogEntry {
                service_type: "identity".to_string(),
                public_urls: vec![IDENTITY_ENDPOINT.to_string()],
            },
            CatalogEntry {
                service_type: "dns".to_string(),
                public_urls: vec![DNS_ENDPOINT.to_string()],
            },
        ];
        provider
    }

    /// Provider with exactly one zone `name` (id "zone-1")
    pub fn with_zone(name: &str) -> Self {
        let provider = Self::new();
        provider.add_zone("zone-1", name);
        provider
    }

    pub fn add_zone(&self, id: &str, name: &str) {
        self.state.lock().unwrap().zones.push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn add_record(&self, id: &str, name: &str, record_type: &str, data: &str) {
        self.state.lock().unwrap().records.push(Record {
            id: id.to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            data: data.to_string(),
            ttl: Some(300),
            description: None,
        });
    }

    pub fn set_catalog(&self, catalog: Vec<CatalogEntry>) {
        self.state.lock().unwrap().catalog = catalog;
    }

    pub fn fail_auth_with(&self, f: impl Fn() -> Error + Send + Sync + 'static) {
        self.state.lock().unwrap().auth_failure = Some(Box::new(f));
    }

    /// Fail the next `times` zone listings with `f`
    pub fn fail_zone_listing(&self, times: usize, f: impl Fn() -> Error + Send + Sync + 'static) {
        let mut state = self.state.lock().unwrap();
        state.zone_failures_remaining = times;
        state.zone_failure = Some(Box::new(f));
    }

    pub fn fail_record_listing(&self, f: impl Fn() -> Error + Send + Sync + 'static) {
        self.state.lock().unwrap().record_listing_failure = Some(Box::new(f));
    }

    /// Creates are recorded as attempted, then fail with `f`
    pub fn fail_creates_with(&self, f: impl Fn() -> Error + Send + Sync + 'static) {
        self.state.lock().unwrap().create_failure = Some(Box::new(f));
    }

    pub fn fail_updates_with(&self, f: impl Fn() -> Error + Send + Sync + 'static) {
        self.state.lock().unwrap().update_failure = Some(Box::new(f));
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn list_zones_calls(&self) -> usize {
        self.list_zones_calls.load(Ordering::SeqCst)
    }

    pub fn list_records_calls(&self) -> usize {
        self.list_records_calls.load(Ordering::SeqCst)
    }

    /// Every DNS-service call, reads included; writes count when attempted
    pub fn dns_calls(&self) -> usize {
        self.list_zones_calls() + self.list_records_calls() + self.write_calls()
    }

    pub fn created(&self) -> Vec<(String, NewRecord)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn updated(&self) -> Vec<(String, String, RecordUpdate)> {
        self.state.lock().unwrap().updated.clone()
    }

    pub fn write_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.created.len() + state.updated.len()
    }

    pub fn records(&self) -> Vec<Record> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn dns_tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().dns_tokens.clone()
    }
}

impl ServiceFactory for FakeProvider {
    fn identity(&self, _endpoint: &str) -> Result<Box<dyn IdentityService>> {
        Ok(Box::new(self.clone()))
    }

    fn dns(&self, endpoint: &str, token: &Token) -> Result<Box<dyn DnsService>> {
        assert_eq!(endpoint, DNS_ENDPOINT, "engine must use the catalog endpoint");
        self.state
            .lock()
            .unwrap()
            .dns_tokens
            .push(token.as_str().to_string());
        Ok(Box::new(self.clone()))
    }
}

#[async_trait::async_trait]
impl IdentityService for FakeProvider {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<AuthSession> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if let Some(f) = &state.auth_failure {
            return Err(f());
        }
        Ok(AuthSession {
            token: Token::new(TOKEN),
            catalog: state.catalog.clone(),
        })
    }
}

#[async_trait::async_trait]
impl DnsService for FakeProvider {
    async fn list_zones(&self, name: Option<&str>) -> Result<Vec<Zone>> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.zone_failures_remaining > 0 {
            state.zone_failures_remaining -= 1;
            if let Some(f) = &state.zone_failure {
                return Err(f());
            }
        }
        Ok(state
            .zones
            .iter()
            .filter(|z| name.is_none_or(|n| z.name == n))
            .cloned()
            .collect())
    }

    async fn list_records(&self, _zone_id: &str) -> Result<Vec<Record>> {
        self.list_records_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if let Some(f) = &state.record_listing_failure {
            return Err(f());
        }
        Ok(state.records.clone())
    }

    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.created.push((zone_id.to_string(), record.clone()));
        if let Some(f) = &state.create_failure {
            return Err(f());
        }
        state.next_record_id += 1;
        let id = format!("new-{}", state.next_record_id);
        state.records.push(Record {
            id: id.clone(),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            data: record.data.clone(),
            ttl: Some(record.ttl),
            description: Some(record.description.clone()),
        });
        Ok(id)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .updated
            .push((zone_id.to_string(), record_id.to_string(), update.clone()));
        if let Some(f) = &state.update_failure {
            return Err(f());
        }
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::api(r#"{"code":404,"type":"record_not_found"}"#))?;
        record.data = update.data.clone();
        record.ttl = Some(update.ttl);
        record.description = Some(update.description.clone());
        Ok(())
    }
}

/// Input for `record`.`domain` -> `value` with default ttl
pub fn input(domain: &str, record: &str, value: &str) -> ReconciliationInput {
    ReconciliationInput::new(
        domain,
        record,
        value,
        ddns_core::engine::DEFAULT_TTL,
        IDENTITY_ENDPOINT,
        Credentials::new("api-user", "api-pass", Some("tenant-1".to_string())),
    )
    .expect("valid input")
}
