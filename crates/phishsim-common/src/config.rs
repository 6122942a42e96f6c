//! Configuration for PhishSim

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "PHISHSIM_CONFIG";

/// Prefix for environment overrides, e.g. `PHISHSIM__BACKEND__URL`
pub const ENV_PREFIX: &str = "PHISHSIM";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Web console configuration
    #[serde(default)]
    pub console: ConsoleConfig,

    /// REST backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Web console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Listen address
    #[serde(default = "default_console_bind")]
    pub bind: String,

    /// Product name shown in the sidebar
    #[serde(default = "default_title")]
    pub title: String,

    /// Label shown as "Authenticated as ..." in the sidebar footer
    #[serde(default = "default_operator_label")]
    pub operator_label: String,

    /// Seconds a toast notification stays visible
    #[serde(default = "default_toast_ttl")]
    pub toast_ttl_secs: u64,

    /// Seconds between page refreshes while an analysis is loading
    #[serde(default = "default_analysis_poll")]
    pub analysis_poll_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind: default_console_bind(),
            title: default_title(),
            operator_label: default_operator_label(),
            toast_ttl_secs: default_toast_ttl(),
            analysis_poll_secs: default_analysis_poll(),
        }
    }
}

impl ConsoleConfig {
    /// Toast lifetime as a `Duration`
    pub fn toast_ttl(&self) -> Duration {
        Duration::from_secs(self.toast_ttl_secs)
    }
}

fn default_console_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_title() -> String {
    "PhishSim".to_string()
}

fn default_operator_label() -> String {
    "Admin".to_string()
}

fn default_toast_ttl() -> u64 {
    3
}

fn default_analysis_poll() -> u64 {
    1
}

/// REST backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL every API path is appended to
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    /// Optional bearer token sent with every request
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
            api_key: None,
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_backend_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "json" or "text"
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

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from the first file found plus environment overrides.
    ///
    /// Without any file the defaults apply.
    pub fn load() -> crate::Result<Self> {
        let mut builder = ::config::Config::builder();

        match Self::locate() {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(::config::File::from(path.as_path()));
            }
            None => tracing::debug!("No configuration file found, using defaults"),
        }

        Self::build(builder)
    }

    /// Layer environment overrides on top of `builder` and deserialize
    fn build(
        builder: ::config::builder::ConfigBuilder<::config::builder::DefaultState>,
    ) -> crate::Result<Self> {
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::Error::Config(format!("Failed to load config: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    fn locate() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(explicit));
        }

        let paths = [
            PathBuf::from("./phishsim.toml"),
            PathBuf::from("/etc/phishsim/config.toml"),
        ];

        paths.into_iter().find(|path| path.exists())
    }
}
