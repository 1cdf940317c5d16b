// # ddnsd - DDNS Daemon
//
// HTTP-triggered updater for one A/AAAA record per request.
//
// The daemon is a thin integration layer:
// 1. Read configuration from environment variables
// 2. Initialize tracing and the runtime
// 3. Wire the ConoHa clients into the reconciler and the workflow runner
// 4. Serve the trigger endpoints until SIGINT/SIGTERM
//
// All DNS and retry logic lives in ddns-core.
//
// ## Configuration
//
// ### Provider
// - `DDNS_IDENTITY_ENDPOINT`: Identity service base URL (required)
// - `DDNS_USERNAME`: API user name (required)
// - `DDNS_PASSWORD`: API password (required)
// - `DDNS_TENANT_ID`: Tenant id (optional)
// - `DDNS_HTTP_TIMEOUT_SECS`: Per-request timeout, 1-300 (default 30)
//
// ### Records
// - `DDNS_TTL`: TTL for created/updated records (default 300)
//
// ### Runner
// - `DDNS_MAX_RETRIES`: Retries after a transient failure, 0-10 (default 3)
// - `DDNS_RETRY_DELAY_SECS`: Delay between retries, 1-300 (default 5)
//
// ### Server
// - `DDNS_LISTEN_ADDR`: Bind address (default 0.0.0.0:8080)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DDNS_IDENTITY_ENDPOINT=https://identity.tyo1.conoha.io/v2.0
// export DDNS_USERNAME=gncu12345678
// export DDNS_PASSWORD=your_password
// export DDNS_TENANT_ID=0123456789abcdef
//
// ddnsd
// curl -X POST 'http://localhost:8080/api/UpdateRecord?domain=example.com.&record=home'
// ```

mod config;
mod server;

use anyhow::Result;
use ddns_core::{MemoryInstanceStore, Reconciler, RetryPolicy, WorkflowEvent, WorkflowRunner};
use ddns_provider_conoha::ConohaFactory;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::server::AppState;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let addr = config.listen_addr()?;
    let core = config.to_core();

    let factory = ConohaFactory::from_config(&core.provider)?;
    let runner = WorkflowRunner::new(
        Reconciler::new(Arc::new(factory)),
        Arc::new(MemoryInstanceStore::new()),
        RetryPolicy::from(&core.runner),
    );
    let (runner, events) = runner.with_events(EVENT_CHANNEL_CAPACITY);
    tokio::spawn(log_events(events));

    info!(
        identity_endpoint = %core.provider.identity_endpoint,
        ttl = core.effective_ttl(),
        max_retries = core.runner.max_retries,
        retry_delay_secs = core.runner.retry_delay_secs,
        "Configuration loaded"
    );

    let app = server::router(AppState {
        runner,
        config: Arc::new(core),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to address {}: {}", addr, e))?;
    info!(%addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down daemon");
    Ok(())
}

/// Trace workflow events until every runner handle is gone
///
/// Failures are already logged at error level by the engine, so events are
/// only traced here.
async fn log_events(mut events: mpsc::Receiver<WorkflowEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            WorkflowEvent::Started {
                instance_id,
                full_name,
            } => debug!(%instance_id, record = %full_name, "Reconciliation started"),
            WorkflowEvent::AttemptFailed {
                instance_id,
                attempt,
                error,
                will_retry,
            } => debug!(%instance_id, attempt, %error, will_retry, "Reconciliation attempt failed"),
            WorkflowEvent::Completed {
                instance_id,
                result,
                attempts,
            } => debug!(%instance_id, ?result, attempts, "Reconciliation completed"),
            WorkflowEvent::Failed {
                instance_id,
                result,
                error,
                attempts,
            } => debug!(%instance_id, ?result, %error, attempts, "Reconciliation failed"),
        }
    }
}

/// Wait for SIGTERM or SIGINT
///
/// If a handler cannot be installed, the other signal still ends the wait.
#[cfg(unix)]
async fn shutdown_signal() {
    let sigterm = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to setup SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let sigint = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to setup SIGINT handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let name = tokio::select! {
        _ = sigterm => "SIGTERM",
        _ = sigint => "SIGINT",
    };
    info!("Received shutdown signal: {}", name);
}

/// Wait for SIGINT
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
