use crate::ConfigError;
use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    ///
    /// Env: ABEX_SERVER_HOST
    /// Default: 127.0.0.1
    pub host: String,

    /// Port to bind the HTTP server to
    ///
    /// Env: ABEX_SERVER_PORT
    /// Default: 8080
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::ValidateError(format!(
                "Server host must be an IP address, got '{}'",
                self.host
            )));
        }

        if self.port == 0 {
            return Err(ConfigError::ValidateError(
                "Server port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
