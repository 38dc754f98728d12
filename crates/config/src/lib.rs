mod args;
mod error;
mod log;
mod metrics;
mod network;
mod server;
mod tokens;

pub use args::Args;
pub use error::ConfigError;
pub use log::{LogConfig, VALID_LOG_LEVELS};
pub use metrics::{MetricsConfig, MetricsError};
pub use network::{
    ABEX_MAINNET_PACKAGE, ABEX_MAINNET_VAULTS_PARENT, Network, NetworkConfig, NetworkError,
    TokenSourceKind, normalize_address,
};
pub use server::ServerConfig;
pub use tokens::{TokenEntry, TokenRegistry, TokenRegistryError, normalize_coin_type};

use serde::Deserialize;
use std::path::Path;

/// Raw `ABEX_*` environment, one field per variable
#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default = "default_server_host")]
    server_host: String,
    #[serde(default = "default_server_port")]
    server_port: u16,

    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    log_json: bool,
    #[serde(default)]
    log_strip_ansi: bool,
    #[serde(default)]
    log_write: bool,
    #[serde(default = "default_log_write_path")]
    log_write_path: String,
    #[serde(default = "default_log_write_max_file_size")]
    log_write_max_file_size: u64,
    #[serde(default = "default_log_write_max_files")]
    log_write_max_files: usize,

    #[serde(default)]
    metrics_enabled: bool,
    #[serde(default = "default_prometheus_prefix")]
    metrics_prometheus_prefix: String,
    #[serde(default = "default_loki_host")]
    metrics_loki_host: String,
    #[serde(default = "default_loki_port")]
    metrics_loki_port: u16,
    #[serde(default)]
    metrics_include_queryparams: bool,

    #[serde(default = "default_network")]
    network: String,
    package_addresses: Option<String>,
    vaults_parent: Option<String>,
    rpc_url: Option<String>,
    #[serde(default = "default_rpc_timeout_secs")]
    rpc_timeout_secs: u64,
    #[serde(default = "default_token_source")]
    token_source: String,

    #[serde(default = "default_batch_concurrency")]
    batch_concurrency: usize,
}

fn default_server_host() -> String {
    ServerConfig::default().host
}
fn default_server_port() -> u16 {
    ServerConfig::default().port
}
fn default_log_level() -> String {
    LogConfig::default().level
}
fn default_log_write_path() -> String {
    LogConfig::default().write_path
}
fn default_log_write_max_file_size() -> u64 {
    LogConfig::default().write_max_file_size
}
fn default_log_write_max_files() -> usize {
    LogConfig::default().write_max_files
}
fn default_prometheus_prefix() -> String {
    MetricsConfig::default().prometheus_prefix
}
fn default_loki_host() -> String {
    MetricsConfig::default().loki_host
}
fn default_loki_port() -> u16 {
    MetricsConfig::default().loki_port
}
fn default_network() -> String {
    Network::default().to_string()
}
fn default_rpc_timeout_secs() -> u64 {
    10
}
fn default_token_source() -> String {
    "static".to_string()
}
fn default_batch_concurrency() -> usize {
    4
}

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub metrics: MetricsConfig,
    pub network: NetworkConfig,

    /// Envelopes normalized in parallel per batch request
    ///
    /// Env: ABEX_BATCH_CONCURRENCY
    /// Default: 4
    pub batch_concurrency: usize,
}

impl IndexerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = envy::prefixed("ABEX_").from_env::<EnvConfig>()?;
        let config = Self::from_env_config(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load variables from `path` (if it exists) into the process env, then read it.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            dotenv::from_path(path).map_err(|source| ConfigError::EnvFileError {
                path: path.display().to_string(),
                source,
            })?;
        }
        Self::from_env()
    }

    fn from_env_config(env: EnvConfig) -> Result<Self, ConfigError> {
        let network = NetworkConfig::from_parts(
            &env.network,
            env.package_addresses.as_deref(),
            env.vaults_parent,
            env.rpc_url,
            env.rpc_timeout_secs,
            &env.token_source,
        )?;

        Ok(Self {
            server: ServerConfig {
                host: env.server_host,
                port: env.server_port,
            },
            log: LogConfig {
                level: env.log_level,
                json: env.log_json,
                strip_ansi: env.log_strip_ansi,
                write: env.log_write,
                write_path: env.log_write_path,
                write_max_file_size: env.log_write_max_file_size,
                write_max_files: env.log_write_max_files,
            },
            metrics: MetricsConfig {
                enabled: env.metrics_enabled,
                prometheus_prefix: env.metrics_prometheus_prefix,
                loki_host: env.metrics_loki_host,
                loki_port: env.metrics_loki_port,
                include_queryparams: env.metrics_include_queryparams,
            },
            network,
            batch_concurrency: env.batch_concurrency,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.log.validate()?;
        self.metrics.validate()?;
        self.network.validate()?;
        if self.batch_concurrency == 0 {
            return Err(ConfigError::ValidateError(
                "Batch concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log: LogConfig::default(),
            metrics: MetricsConfig::default(),
            network: NetworkConfig::default(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}
