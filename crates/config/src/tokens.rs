use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::network::{Network, normalize_address};

#[derive(Debug, Error)]
pub enum TokenRegistryError {
    #[error("Failed to parse token registry JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Invalid coin type '{0}' in token registry")]
    InvalidCoinType(String),

    #[error("Unknown network in token registry: {0}")]
    UnknownNetwork(#[from] crate::network::NetworkError),
}

/// Static symbol/decimals for one coin type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
    pub symbol: String,
    pub decimals: u8,
}

/// Rewrite the address part of `addr::module::Name` to its long form.
///
/// Returns `None` when the address part is not a Sui address.
pub fn normalize_coin_type(coin_type: &str) -> Option<String> {
    let (address, rest) = coin_type.trim().split_once("::")?;
    let address = normalize_address(address).ok()?;
    Some(format!("{}::{}", address, rest))
}

/// Embedded per-network token registry
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    networks: HashMap<Network, HashMap<String, TokenEntry>>,
}

impl TokenRegistry {
    pub fn load() -> Result<Self, TokenRegistryError> {
        const REGISTRY_JSON: &str = include_str!("token_registry.json");
        Self::from_json(REGISTRY_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, TokenRegistryError> {
        let raw: HashMap<String, HashMap<String, TokenEntry>> = serde_json::from_str(json)?;

        let mut networks = HashMap::with_capacity(raw.len());
        for (network, coins) in raw {
            let network = Network::parse(&network)?;
            let mut normalized = HashMap::with_capacity(coins.len());
            for (coin_type, entry) in coins {
                let key = normalize_coin_type(&coin_type)
                    .ok_or_else(|| TokenRegistryError::InvalidCoinType(coin_type.clone()))?;
                normalized.insert(key, entry);
            }
            networks.insert(network, normalized);
        }

        Ok(Self { networks })
    }

    pub fn get(&self, network: Network, coin_type: &str) -> Option<&TokenEntry> {
        let key = normalize_coin_type(coin_type)?;
        self.networks.get(&network)?.get(&key)
    }

    pub fn len(&self, network: Network) -> usize {
        self.networks.get(&network).map(HashMap::len).unwrap_or(0)
    }

    pub fn is_empty(&self, network: Network) -> bool {
        self.len(network) == 0
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::load().expect("Failed to load embedded token registry")
    }
}
