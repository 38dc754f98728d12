use serde::Deserialize;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Validates that a string is a valid host (IP address or hostname)
pub(crate) fn is_valid_host(host: &str) -> bool {
    if IpAddr::from_str(host).is_ok() {
        return true;
    }

    // RFC 1123 hostname
    if host.is_empty() || host.len() > 253 {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Invalid host address or hostname: {0}")]
    InvalidHost(String),

    #[error("Port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),

    #[error(
        "Invalid Prometheus prefix '{0}': must start with [a-zA-Z_:] and contain only [a-zA-Z0-9_:]"
    )]
    InvalidPrometheusPrefix(String),
}

/// Configuration for Prometheus metrics and Loki log shipping
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Register the Prometheus registry, mount `/metrics` and `/metrics.json`
    /// with the HTTP metrics middleware, and ship logs to Loki
    ///
    /// Env: ABEX_METRICS_ENABLED
    /// Default: false
    pub enabled: bool,

    /// Prometheus metric name prefix (default: "abex_indexer")
    ///
    /// Env: ABEX_METRICS_PROMETHEUS_PREFIX
    pub prometheus_prefix: String,

    /// Loki server host
    ///
    /// Env: ABEX_METRICS_LOKI_HOST
    pub loki_host: String,

    /// Loki server port
    ///
    /// Env: ABEX_METRICS_LOKI_PORT
    pub loki_port: u16,

    /// Include query parameter names in HTTP route labels
    ///
    /// Env: ABEX_METRICS_INCLUDE_QUERYPARAMS
    pub include_queryparams: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prometheus_prefix: "abex_indexer".to_string(),
            loki_host: "127.0.0.1".to_string(),
            loki_port: 3100,
            include_queryparams: false,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), MetricsError> {
        // Must match [a-zA-Z_:][a-zA-Z0-9_:]* or Prometheus drops the series
        let mut chars = self.prometheus_prefix.chars();
        if let Some(first) = chars.next() {
            if !first.is_ascii_alphabetic() && first != '_' && first != ':' {
                return Err(MetricsError::InvalidPrometheusPrefix(
                    self.prometheus_prefix.clone(),
                ));
            }

            if chars.any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != ':') {
                return Err(MetricsError::InvalidPrometheusPrefix(
                    self.prometheus_prefix.clone(),
                ));
            }
        }

        if !is_valid_host(&self.loki_host) {
            return Err(MetricsError::InvalidHost(self.loki_host.clone()));
        }

        if self.loki_port == 0 {
            return Err(MetricsError::InvalidPort(self.loki_port));
        }

        Ok(())
    }

    /// Loki push URL, only when log shipping is enabled
    pub fn loki_url(&self) -> Option<String> {
        self.enabled
            .then(|| format!("http://{}:{}", self.loki_host, self.loki_port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metrics_config() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.prometheus_prefix, "abex_indexer");
        assert_eq!(config.loki_host, "127.0.0.1");
        assert_eq!(config.loki_port, 3100);
        assert!(config.loki_url().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loki_url_when_enabled() {
        let config = MetricsConfig {
            enabled: true,
            loki_host: "loki.monitoring.svc.cluster.local".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.loki_url().as_deref(),
            Some("http://loki.monitoring.svc.cluster.local:3100")
        );
    }

    #[test]
    fn test_invalid_hostname_starting_with_hyphen() {
        let config = MetricsConfig {
            loki_host: "-invalid".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_loki_port() {
        let config = MetricsConfig {
            loki_port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prometheus_prefix_rules() {
        for prefix in ["my_app_metrics", "app:metrics", "_metrics", ""] {
            let config = MetricsConfig {
                prometheus_prefix: prefix.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "prefix {:?} should be valid", prefix);
        }

        for prefix in ["123metrics", "my-metrics", "my.metrics"] {
            let config = MetricsConfig {
                prometheus_prefix: prefix.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "prefix {:?} should be rejected", prefix);
        }
    }
}
