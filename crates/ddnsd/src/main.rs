// # ddnsd - DDNS Daemon
//
// The ddnsd daemon is a thin integration layer responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the IP resolver and Cloudflare record directory
// 4. Running the DDNS engine until a signal or a fatal error
//
// All update logic lives in ddns-core.
//
// ## Configuration
//
// ### Required
// - `CLOUDFLARE_API_TOKEN`: API token with Zone:DNS:Edit permission
// - `CLOUDFLARE_ZONE_ID`: Zone identifier
// - `CLOUDFLARE_DNS_RECORD_NAME`: Fully-qualified record name
// - `CLOUDFLARE_DNS_RECORD_TYPE`: Record type (e.g. A)
// - `INTERVAL`: Poll interval in minutes
//
// ### Optional
// - `IP_SERVICE_URL`: Public IP echo service (default https://api.ipify.org)
// - `DDNS_MODE`: Set to `dry-run` to skip DNS writes
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
// export CLOUDFLARE_ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export CLOUDFLARE_DNS_RECORD_NAME=home.example.com
// export CLOUDFLARE_DNS_RECORD_TYPE=A
// export INTERVAL=5
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{DdnsEngine, EngineEvent, ZoneConfig};
use ddns_ip_http::HttpIpResolver;
use ddns_provider_cloudflare::CloudflareDirectory;
use std::env;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (a DNS directory operation failed)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (fatal directory failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Parse `DDNS_LOG_LEVEL` (defaults to info)
fn log_level_from_env() -> Result<Level> {
    let raw = env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

fn main() -> ExitCode {
    let log_level = match log_level_from_env() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    // Load and validate configuration from environment
    let config = match ZoneConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };
    debug!("Configuration loaded: {:?}", config);

    let engine = match build_engine(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

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
        if let Err(e) = run_daemon(engine).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the resolver, directory and engine from configuration
fn build_engine(config: ZoneConfig) -> Result<(DdnsEngine, mpsc::Receiver<EngineEvent>)> {
    let resolver = HttpIpResolver::new(config.ip_service_url.clone())?;
    let directory = CloudflareDirectory::from_config(&config)?;

    info!("IP service: {}", resolver.url());
    info!("Provider: cloudflare (zone {})", config.zone_id);

    let engine = DdnsEngine::new(Box::new(resolver), Box::new(directory), config)?;
    Ok(engine)
}

/// Run the daemon
async fn run_daemon(engine: (DdnsEngine, mpsc::Receiver<EngineEvent>)) -> Result<()> {
    run_until(engine, wait_for_shutdown()).await
}

/// Run the engine until `shutdown` resolves or the engine fails
///
/// A failure to wait for the shutdown signal is fatal.
async fn run_until<F>(
    (engine, mut events): (DdnsEngine, mpsc::Receiver<EngineEvent>),
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = Result<&'static str>>,
{
    // Keep the event channel drained; the engine logs transitions itself
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let run = engine.run_with_shutdown(shutdown_rx);
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result?,
        signal = shutdown => {
            let signal = signal.context("Signal handling error")?;
            info!("Received shutdown signal: {}", signal);
            let _ = shutdown_tx.send(());
            run.await?;
        }
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
