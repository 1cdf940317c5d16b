// # ConoHa Provider
//
// Identity and DNS service clients for the DDNS updater.
//
// ## Scope
//
// - One HTTP request per trait call; retries belong to the workflow runner
// - Errors follow the provider convention (JSON error body vs bare status)
// - No caching: the token and catalog live for one reconciliation only
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::Reconciler;
// use ddns_provider_conoha::ConohaFactory;
// use std::sync::Arc;
//
// let factory = ConohaFactory::from_config(&config.provider)?;
// let reconciler = Reconciler::new(Arc::new(factory));
// ```

mod dns;
mod http;
mod identity;

pub use dns::DnsClient;
pub use http::DEFAULT_HTTP_TIMEOUT;
pub use identity::IdentityClient;

use ddns_core::traits::{DnsService, IdentityService, ServiceFactory, Token};
use ddns_core::{ProviderConfig, Result};
use std::time::Duration;

/// Builds identity and DNS clients that share one HTTP connection pool
#[derive(Debug, Clone)]
pub struct ConohaFactory {
    client: reqwest::Client,
}

impl ConohaFactory {
    /// Create a factory whose clients use the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(timeout)?,
        })
    }

    /// Create a factory from the provider configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.http_timeout_secs))
    }
}

impl ServiceFactory for ConohaFactory {
    fn identity(&self, endpoint: &str) -> Result<Box<dyn IdentityService>> {
        Ok(Box::new(IdentityClient::with_client(self.client.clone(), endpoint)?))
    }

    fn dns(&self, endpoint: &str, token: &Token) -> Result<Box<dyn DnsService>> {
        Ok(Box::new(DnsClient::with_client(
            self.client.clone(),
            endpoint,
            token.clone(),
        )?))
    }
}
