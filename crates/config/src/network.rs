use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// ABEX core package on Sui mainnet
pub const ABEX_MAINNET_PACKAGE: &str =
    "0xceab84acf6bf70f503c3b0627acaff6b3f84cee0f2d7ed53d00fa6c2a168d14f";

/// Parent object of the ABEX vault dynamic fields on mainnet
pub const ABEX_MAINNET_VAULTS_PARENT: &str =
    "0x3c6595e543c4766dd63b5b2fa918516bac2920bc1944da068be031dced46a18d";

pub const SUI_MAINNET_RPC: &str = "https://fullnode.mainnet.sui.io:443";
pub const SUI_TESTNET_RPC: &str = "https://fullnode.testnet.sui.io:443";

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Unknown network '{0}'. Must be one of: mainnet, testnet")]
    UnknownNetwork(String),

    #[error("Unknown token source '{0}'. Must be one of: static, rpc")]
    UnknownTokenSource(String),

    #[error("Invalid Sui address '{0}'")]
    InvalidAddress(String),

    #[error("No ABEX package address bound for {0}")]
    NoPackageBound(Network),

    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },
}

/// Network selector, picks the static token registry and default bindings
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn parse(s: &str) -> Result<Self, NetworkError> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(NetworkError::UnknownNetwork(other.to_string())),
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => SUI_MAINNET_RPC,
            Network::Testnet => SUI_TESTNET_RPC,
        }
    }

    fn default_packages(&self) -> Vec<String> {
        match self {
            Network::Mainnet => vec![ABEX_MAINNET_PACKAGE.to_string()],
            Network::Testnet => vec![],
        }
    }

    fn default_vaults_parent(&self) -> Option<String> {
        match self {
            Network::Mainnet => Some(ABEX_MAINNET_VAULTS_PARENT.to_string()),
            Network::Testnet => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where token symbol/decimals come from. A deployment uses exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenSourceKind {
    /// Embedded per-network registry
    #[default]
    Static,
    /// `suix_getCoinMetadata` against the configured fullnode
    Rpc,
}

impl TokenSourceKind {
    pub fn parse(s: &str) -> Result<Self, NetworkError> {
        match s.trim().to_lowercase().as_str() {
            "static" | "registry" => Ok(TokenSourceKind::Static),
            "rpc" => Ok(TokenSourceKind::Rpc),
            other => Err(NetworkError::UnknownTokenSource(other.to_string())),
        }
    }
}

/// Expand a Sui address to its canonical `0x` + 64 lower-case hex form.
pub fn normalize_address(address: &str) -> Result<String, NetworkError> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);

    if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(NetworkError::InvalidAddress(address.to_string()));
    }

    Ok(format!("0x{:0>64}", hex.to_lowercase()))
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Env: ABEX_NETWORK
    /// Default: mainnet
    pub network: Network,

    /// Packages whose events are accepted, normalized to long form
    ///
    /// Env: ABEX_PACKAGE_ADDRESSES (comma separated)
    /// Default: the ABEX mainnet package on mainnet, none on testnet
    pub package_addresses: Vec<String>,

    /// Env: ABEX_VAULTS_PARENT
    pub vaults_parent: Option<String>,

    /// Env: ABEX_RPC_URL
    /// Default: the public fullnode of the selected network
    pub rpc_url: String,

    /// Env: ABEX_RPC_TIMEOUT_SECS
    /// Default: 10
    pub rpc_timeout_secs: u64,

    /// Env: ABEX_TOKEN_SOURCE
    /// Default: static
    pub token_source: TokenSourceKind,
}

impl NetworkConfig {
    /// Build from raw env values, filling network-dependent defaults.
    pub(crate) fn from_parts(
        network: &str,
        package_addresses: Option<&str>,
        vaults_parent: Option<String>,
        rpc_url: Option<String>,
        rpc_timeout_secs: u64,
        token_source: &str,
    ) -> Result<Self, NetworkError> {
        let network = Network::parse(network)?;

        let package_addresses = match package_addresses {
            Some(list) if !list.trim().is_empty() => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(normalize_address)
                .collect::<Result<Vec<_>, _>>()?,
            _ => network.default_packages(),
        };

        Ok(Self {
            network,
            package_addresses,
            vaults_parent: vaults_parent.or_else(|| network.default_vaults_parent()),
            rpc_url: rpc_url.unwrap_or_else(|| network.default_rpc_url().to_string()),
            rpc_timeout_secs,
            token_source: TokenSourceKind::parse(token_source)?,
        })
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.package_addresses.is_empty() {
            return Err(NetworkError::NoPackageBound(self.network));
        }

        for address in &self.package_addresses {
            normalize_address(address)?;
        }

        if let Some(parent) = &self.vaults_parent {
            normalize_address(parent)?;
        }

        let parsed = url::Url::parse(&self.rpc_url).map_err(|e| NetworkError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(NetworkError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
                reason: format!("scheme '{}' is not http or https", scheme),
            }),
        }
    }

    /// Whether an event type tag belongs to one of the bound packages.
    pub fn is_bound(&self, type_tag: &str) -> bool {
        let Some((package, _)) = type_tag.split_once("::") else {
            return false;
        };
        match normalize_address(package) {
            Ok(package) => self.package_addresses.contains(&package),
            Err(_) => false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let network = Network::default();
        Self {
            network,
            package_addresses: network.default_packages(),
            vaults_parent: network.default_vaults_parent(),
            rpc_url: network.default_rpc_url().to_string(),
            rpc_timeout_secs: 10,
            token_source: TokenSourceKind::default(),
        }
    }
}
