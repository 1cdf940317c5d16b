//! Configuration types for the DDNS updater
//!
//! This module defines the configuration structures handed to the engine
//! and the workflow runner. Loading them (from the environment) is the
//! daemon's job; these types only carry and validate values.

use serde::{Deserialize, Serialize};

use crate::engine::{parse_ttl, ReconciliationInput};
use crate::traits::Credentials;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Identity endpoint, credentials and HTTP settings
    pub provider: ProviderConfig,

    /// Retry settings for the workflow runner
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Raw ttl override, parsed leniently (see [`parse_ttl`])
    #[serde(default)]
    pub ttl: Option<String>,
}

impl DdnsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.runner.validate()?;
        Ok(())
    }

    /// Effective ttl for new and updated records
    pub fn effective_ttl(&self) -> u32 {
        parse_ttl(self.ttl.as_deref())
    }

    /// Build a reconciliation input for one trigger request
    ///
    /// # Errors
    ///
    /// `Error::Validation` if the request fields are missing or malformed.
    pub fn input_for(
        &self,
        domain: &str,
        record: &str,
        value: &str,
    ) -> Result<ReconciliationInput, crate::Error> {
        ReconciliationInput::new(
            domain,
            record,
            value,
            self.effective_ttl(),
            self.provider.identity_endpoint.clone(),
            self.provider.credentials.clone(),
        )
    }
}

/// Identity endpoint, credentials and HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Identity service base URL (e.g. "https://identity.tyo1.conoha.io/v2.0")
    pub identity_endpoint: String,

    /// API credentials
    pub credentials: Credentials,

    /// Per-request timeout of the provider HTTP client (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.identity_endpoint.is_empty() {
            return Err(crate::Error::config("Identity endpoint cannot be empty"));
        }
        if !self.identity_endpoint.starts_with("https://")
            && !self.identity_endpoint.starts_with("http://")
        {
            return Err(crate::Error::config(format!(
                "Identity endpoint must use HTTP or HTTPS scheme. Got: {}",
                self.identity_endpoint
            )));
        }
        if self.credentials.username.is_empty() {
            return Err(crate::Error::config("Username cannot be empty"));
        }
        if self.credentials.password.is_empty() {
            return Err(crate::Error::config("Password cannot be empty"));
        }
        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("HTTP timeout must be > 0"));
        }
        Ok(())
    }
}

/// Workflow runner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum number of retry attempts after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Delay between retry attempts (in seconds)
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl RunnerConfig {
    /// Validate the runner configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_retries > 10 {
            return Err(crate::Error::config(format!(
                "max_retries must be between 0 and 10. Got: {}",
                self.max_retries
            )));
        }
        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_http_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DdnsConfig {
        DdnsConfig {
            provider: ProviderConfig {
                identity_endpoint: "https://identity.example/v2.0".to_string(),
                credentials: Credentials::new("user", "pass", None),
                http_timeout_secs: 30,
            },
            runner: RunnerConfig::default(),
            ttl: None,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_invalid_endpoint_scheme() {
        let mut config = config();
        config.provider.identity_endpoint = "ftp://identity.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_ttl() {
        let mut config = config();
        assert_eq!(config.effective_ttl(), 300);
        config.ttl = Some("abc".to_string());
        assert_eq!(config.effective_ttl(), 300);
        config.ttl = Some("600".to_string());
        assert_eq!(config.effective_ttl(), 600);
    }

    #[test]
    fn test_input_for_uses_config() {
        let mut config = config();
        config.ttl = Some("120".to_string());

        let input = config.input_for("example.com", "@", "192.0.2.1").unwrap();
        assert_eq!(input.full_name(), "example.com");
        assert_eq!(input.ttl(), 120);
        assert_eq!(input.identity_endpoint(), "https://identity.example/v2.0");
    }

    #[test]
    fn test_runner_defaults_from_serde() {
        let runner: RunnerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(runner, RunnerConfig::default());
        assert_eq!(runner.max_retries, 3);
        assert_eq!(runner.retry_delay_secs, 5);
    }
}
