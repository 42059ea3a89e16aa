//! Server Configuration
//!
//! Configuration management for the minibank server.
//! Supports environment variables, config files, and CLI arguments.
//!
//! The signing key and the credential pair have no usable defaults; the
//! server refuses to start until they are provided.

use minibank_api::ApiConfig;
use minibank_auth::AuthConfig;
use minibank_ledger::DEFAULT_STARTING_BALANCE;
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Signing key, credentials and token lifetime
    #[serde(default)]
    pub auth: AuthConfig,

    /// Ledger configuration
    #[serde(default)]
    pub ledger: LedgerSettings,

    /// API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Ledger settings
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// Balance at process start
    #[serde(default = "default_starting_balance")]
    pub starting_balance: f64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            starting_balance: default_starting_balance(),
        }
    }
}

/// API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable request tracing
    #[serde(default = "default_true")]
    pub enable_tracing: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_tracing: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics
    #[serde(default)]
    pub enabled: bool,

    /// Metrics port (separate from main server)
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_starting_balance() -> f64 {
    DEFAULT_STARTING_BALANCE
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        // Later sources override earlier ones
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        // Add config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        // Add environment variables with MINIBANK__ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("MINIBANK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let server_config = builder.build()?.try_deserialize()?;

        Ok(server_config)
    }

    /// API settings as the router expects them
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            enable_cors: self.api.enable_cors,
            cors_origins: self.api.cors_origins.clone(),
            enable_tracing: self.api.enable_tracing,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self.auth.validate().err().unwrap_or_default();

        let balance = self.ledger.starting_balance;
        if !balance.is_finite() || balance < 0.0 {
            errors.push("Starting balance must be a finite, non-negative number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_auth::SigningKey;
    use std::time::Duration;

    fn configured() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.auth.signing_key = SigningKey::from("k".repeat(32));
        config.auth.username = "user".to_string();
        config.auth.password = "password123".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.ledger.starting_balance, 1000.0);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_defaults_have_no_secrets() {
        let errors = ServerConfig::default().validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_configured_is_valid() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_negative_starting_balance_rejected() {
        let mut config = configured();
        config.ledger.starting_balance = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_section_reads_humantime_ttl() {
        let config: ServerConfig = serde_json::from_str(
            r#"{"auth": {"signing_key": "abc", "username": "u", "password": "p", "token_ttl": "15m"}}"#,
        )
        .unwrap();
        assert_eq!(config.auth.token_ttl, Duration::from_secs(900));
        assert_eq!(config.auth.signing_key.as_bytes(), b"abc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = configured();
        config.auth.token_ttl = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let printed = format!("{:?}", configured());
        assert!(!printed.contains("password123"));
        assert!(!printed.contains(&"k".repeat(32)));
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: ServerConfig = serde_json::from_str(
            r#"{"auth": {"signing_key": "abc", "username": "u", "password": "p"}, "ledger": {"starting_balance": 50}}"#,
        )
        .unwrap();
        assert_eq!(config.auth.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.ledger.starting_balance, 50.0);
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
