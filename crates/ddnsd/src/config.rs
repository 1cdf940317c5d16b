//! Environment configuration for the daemon
//!
//! Everything is read from `DDNS_*` variables, validated up front, and then
//! handed to the core as a [`DdnsConfig`].

use anyhow::{Context, Result};
use ddns_core::traits::Credentials;
use ddns_core::{DdnsConfig, ProviderConfig, RunnerConfig};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Daemon configuration
pub struct Config {
    pub identity_endpoint: String,
    pub username: String,
    /// ⚠️ NEVER log this value
    pub password: String,
    pub tenant_id: Option<String>,
    pub ttl: Option<String>,
    pub listen_addr: String,
    pub log_level: String,
    pub max_retries: usize,
    pub retry_delay_secs: u64,
    pub http_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("identity_endpoint", &self.identity_endpoint)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("tenant_id", &self.tenant_id)
            .field("ttl", &self.ttl)
            .field("listen_addr", &self.listen_addr)
            .field("log_level", &self.log_level)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            identity_endpoint: required(&non_empty, "DDNS_IDENTITY_ENDPOINT")?,
            username: required(&non_empty, "DDNS_USERNAME")?,
            password: required(&non_empty, "DDNS_PASSWORD")?,
            tenant_id: non_empty("DDNS_TENANT_ID"),
            ttl: non_empty("DDNS_TTL"),
            listen_addr: non_empty("DDNS_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            log_level: non_empty("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            max_retries: numeric(&non_empty, "DDNS_MAX_RETRIES", 3)?,
            retry_delay_secs: numeric(&non_empty, "DDNS_RETRY_DELAY_SECS", 5)?,
            http_timeout_secs: numeric(&non_empty, "DDNS_HTTP_TIMEOUT_SECS", 30)?,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.identity_endpoint.starts_with("https://")
            && !self.identity_endpoint.starts_with("http://")
        {
            anyhow::bail!(
                "DDNS_IDENTITY_ENDPOINT must use HTTP or HTTPS scheme. Got: {}",
                self.identity_endpoint
            );
        }

        if self.identity_endpoint.starts_with("http://") {
            eprintln!(
                "WARNING: DDNS_IDENTITY_ENDPOINT uses HTTP (not HTTPS). \
                Credentials will be sent in clear text."
            );
        }

        self.listen_addr()?;
        self.log_level()?;

        if self.max_retries > 10 {
            anyhow::bail!(
                "DDNS_MAX_RETRIES must be between 0 and 10. Got: {}",
                self.max_retries
            );
        }

        if !(1..=300).contains(&self.retry_delay_secs) {
            anyhow::bail!(
                "DDNS_RETRY_DELAY_SECS must be between 1 and 300 seconds. Got: {}",
                self.retry_delay_secs
            );
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "DDNS_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        self.to_core().validate()?;
        Ok(())
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().with_context(|| {
            format!(
                "DDNS_LISTEN_ADDR '{}' is not a valid socket address (e.g. 0.0.0.0:8080)",
                self.listen_addr
            )
        })
    }

    /// Parsed log level
    pub fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Core configuration for the engine and the runner
    pub fn to_core(&self) -> DdnsConfig {
        DdnsConfig {
            provider: ProviderConfig {
                identity_endpoint: self.identity_endpoint.clone(),
                credentials: Credentials::new(
                    self.username.clone(),
                    self.password.clone(),
                    self.tenant_id.clone(),
                ),
                http_timeout_secs: self.http_timeout_secs,
            },
            runner: RunnerConfig {
                max_retries: self.max_retries,
                retry_delay_secs: self.retry_delay_secs,
            },
            ttl: self.ttl.clone(),
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("{key} is required. Set it via: export {key}=..."))
}

fn numeric<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a non-negative integer. Got: {raw}")),
        None => Ok(default),
    }
}
