//! minibank Server
//!
//! Single-process HTTP service: one configured user logs in for a bearer
//! token and uses it to read, deposit to, and withdraw from a shared
//! in-memory balance.
//!
//! # Usage
//!
//! ```bash
//! # Secrets from the environment
//! MINIBANK_SIGNING_KEY=... MINIBANK_USERNAME=user MINIBANK_PASSWORD=... minibank-server
//!
//! # Start with custom config
//! minibank-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! MINIBANK__SERVER__PORT=8080 minibank-server
//! ```

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use minibank_api::{create_router, AppState};
use minibank_auth::{AuthService, SigningKey};
use minibank_ledger::Ledger;

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// minibank server - token-gated balance over HTTP
#[derive(Parser, Debug)]
#[command(name = "minibank-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "MINIBANK_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "MINIBANK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MINIBANK_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MINIBANK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "MINIBANK_LOG_FORMAT")]
    log_format: Option<String>,

    /// Token signing secret
    #[arg(long, env = "MINIBANK_SIGNING_KEY", hide_env_values = true)]
    signing_key: Option<String>,

    /// Accepted username
    #[arg(long, env = "MINIBANK_USERNAME")]
    username: Option<String>,

    /// Accepted password
    #[arg(long, env = "MINIBANK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, env = "MINIBANK_TOKEN_TTL_SECS")]
    token_ttl_secs: Option<u64>,

    /// Balance at process start
    #[arg(long, env = "MINIBANK_STARTING_BALANCE")]
    starting_balance: Option<f64>,
}

impl Args {
    /// Apply CLI overrides on top of file and environment configuration
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(key) = self.signing_key {
            config.auth.signing_key = SigningKey::from(key);
        }
        if let Some(username) = self.username {
            config.auth.username = username;
        }
        if let Some(password) = self.password {
            config.auth.password = password;
        }
        if let Some(ttl) = self.token_ttl_secs {
            config.auth.token_ttl = Duration::from_secs(ttl);
        }
        if let Some(balance) = self.starting_balance {
            config.ledger.starting_balance = balance;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    // Load configuration
    let mut server_config = ServerConfig::load(args.config.take().as_deref())?;
    args.apply(&mut server_config);

    // Initialize logging
    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting minibank server"
    );

    validate_config(&server_config)?;

    let auth = init_auth(&server_config);
    let ledger = Ledger::new(server_config.ledger.starting_balance);
    let state = Arc::new(AppState::new(auth, ledger));

    let app = create_router(state, server_config.api_config());

    // Start metrics server if enabled
    if server_config.metrics.enabled {
        start_metrics_server(&server_config.metrics)?;
    }

    let listener = tokio::net::TcpListener::bind((
        server_config.server.host.as_str(),
        server_config.server.port,
    ))
    .await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init()?,
    }

    Ok(())
}

/// Refuse to start without a signing key and credentials
fn validate_config(config: &ServerConfig) -> anyhow::Result<()> {
    if let Err(errors) = config.validate() {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        anyhow::bail!("Invalid configuration: {}", errors.join("; "));
    }

    if config.auth.has_weak_key() {
        tracing::warn!(
            length = config.auth.signing_key.len(),
            "Signing key is shorter than 32 bytes"
        );
    }

    Ok(())
}

/// Initialize authentication service
fn init_auth(config: &ServerConfig) -> AuthService {
    let auth = AuthService::new(&config.auth);

    tracing::info!(
        username = %auth.credentials.username(),
        token_ttl = ?config.auth.token_ttl,
        "Authentication service initialized"
    );

    auth
}

/// Install the Prometheus exporter and its scrape listener
fn start_metrics_server(config: &config::MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(port = config.port, "Metrics server started");

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
