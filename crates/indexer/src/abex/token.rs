// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Coin type to symbol/decimals resolution.

use async_trait::async_trait;
use config::{Network, TokenRegistry};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;

const FALLBACK_SYMBOL: &str = "unknown";
const FALLBACK_DECIMALS: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn fallback() -> Self {
        Self {
            symbol: FALLBACK_SYMBOL.to_string(),
            decimals: FALLBACK_DECIMALS,
        }
    }

    /// Canonical token from on-chain coin metadata.
    ///
    /// Bridged coins are published as e.g. name "Wrapped Ether", symbol "WETH";
    /// those lose the leading `W`. Symbols are always lower-case.
    pub fn from_metadata(name: &str, symbol: &str, decimals: u8) -> Self {
        let symbol = if name.starts_with("Wrapped") && symbol.starts_with('W') && symbol.len() >= 4 {
            &symbol[1..]
        } else {
            symbol
        };

        let symbol = if symbol.is_empty() {
            FALLBACK_SYMBOL.to_string()
        } else {
            symbol.to_lowercase()
        };

        Self { symbol, decimals }
    }

    /// 10^decimals
    pub fn scale(&self) -> f64 {
        10f64.powi(self.decimals as i32)
    }
}

#[derive(Debug, Error)]
pub enum TokenLookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("No metadata for coin type '{0}'")]
    NotFound(String),
}

/// A place token metadata can be looked up.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn lookup(&self, raw_type: &str, network: Network) -> Result<TokenInfo, TokenLookupError>;
}

/// Embedded per-network registry
pub struct StaticRegistry {
    registry: TokenRegistry,
}

impl StaticRegistry {
    pub fn new(registry: TokenRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl TokenSource for StaticRegistry {
    async fn lookup(&self, raw_type: &str, network: Network) -> Result<TokenInfo, TokenLookupError> {
        self.registry
            .get(network, raw_type)
            .map(|entry| TokenInfo {
                symbol: entry.symbol.to_lowercase(),
                decimals: entry.decimals,
            })
            .ok_or_else(|| TokenLookupError::NotFound(raw_type.to_string()))
    }
}

/// Sui JSON-RPC `suix_getCoinMetadata`
pub struct RpcMetadataSource {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<CoinMetadata>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CoinMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    decimals: Option<u8>,
}

impl RpcMetadataSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TokenSource for RpcMetadataSource {
    async fn lookup(&self, raw_type: &str, _network: Network) -> Result<TokenInfo, TokenLookupError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "suix_getCoinMetadata",
            "params": [raw_type],
        });

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        token_from_response(response, raw_type)
    }
}

/// Map a `suix_getCoinMetadata` reply; a `null` result means the coin has no metadata.
fn token_from_response(response: RpcResponse, raw_type: &str) -> Result<TokenInfo, TokenLookupError> {
    if let Some(error) = response.error {
        return Err(TokenLookupError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    let metadata = response
        .result
        .ok_or_else(|| TokenLookupError::NotFound(raw_type.to_string()))?;

    Ok(TokenInfo::from_metadata(
        &metadata.name,
        &metadata.symbol,
        metadata.decimals.unwrap_or(FALLBACK_DECIMALS),
    ))
}

/// Read-through cache in front of a [`TokenSource`].
///
/// Entries are keyed by the raw type exactly as it appeared in the event and are
/// never replaced once written. Failed lookups resolve to [`TokenInfo::fallback`]
/// and are not cached.
pub struct TokenResolver {
    source: Arc<dyn TokenSource>,
    cache: RwLock<HashMap<String, TokenInfo>>,
}

impl TokenResolver {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, raw_type: &str, network: Network) -> TokenInfo {
        if let Some(hit) = self.cached(raw_type) {
            return hit;
        }

        match self.source.lookup(raw_type, network).await {
            Ok(info) => self.insert_if_absent(raw_type, info),
            Err(err) => {
                tracing::warn!(
                    coin_type = %raw_type,
                    network = %network,
                    error = %err,
                    "Token lookup failed, using fallback"
                );
                TokenInfo::fallback()
            }
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn cached(&self, raw_type: &str) -> Option<TokenInfo> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(raw_type)
            .cloned()
    }

    // A concurrent resolver may have filled the entry while we were looking up.
    fn insert_if_absent(&self, raw_type: &str, info: TokenInfo) -> TokenInfo {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(raw_type.to_string())
            .or_insert(info)
            .clone()
    }
}
