use config::{IndexerConfig, TokenRegistry, TokenRegistryError, TokenSourceKind};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::abex::{
    EventLogSink, EventNormalizer, MetricsSink, RpcMetadataSource, StaticRegistry,
    TokenResolver, TokenSource, TracingEventLog, VaultSnapshotDecoder,
};
use crate::metrics::PrometheusSink;
use crate::routes::RouteRegistry;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to load token registry: {0}")]
    TokenRegistry(#[from] TokenRegistryError),

    #[error("Failed to build RPC client: {0}")]
    RpcClient(#[from] reqwest::Error),
}

/// Everything a handler needs, shared between requests.
///
/// The normalizer and the vault decoder share one token resolver, so both see the
/// same cache.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<IndexerConfig>,
    pub normalizer: Arc<EventNormalizer>,
    pub vaults: Arc<VaultSnapshotDecoder>,
    pub metrics: Arc<dyn MetricsSink>,
    pub event_log: Arc<dyn EventLogSink>,
    pub route_registry: RouteRegistry,
}

impl AppState {
    pub fn new(config: IndexerConfig) -> Result<Self, StateError> {
        let source: Arc<dyn TokenSource> = match config.network.token_source {
            TokenSourceKind::Static => Arc::new(StaticRegistry::new(TokenRegistry::load()?)),
            TokenSourceKind::Rpc => Arc::new(RpcMetadataSource::new(
                config.network.rpc_url.clone(),
                Duration::from_secs(config.network.rpc_timeout_secs),
            )?),
        };

        tracing::info!(
            network = %config.network.network,
            token_source = ?config.network.token_source,
            "Token source ready"
        );

        Ok(Self::with_parts(
            config,
            source,
            Arc::new(PrometheusSink),
            Arc::new(TracingEventLog),
        ))
    }

    pub fn with_parts(
        config: IndexerConfig,
        source: Arc<dyn TokenSource>,
        metrics: Arc<dyn MetricsSink>,
        event_log: Arc<dyn EventLogSink>,
    ) -> Self {
        let network = config.network.network;
        let resolver = Arc::new(TokenResolver::new(source));

        Self {
            normalizer: Arc::new(EventNormalizer::new(resolver.clone(), network)),
            vaults: Arc::new(VaultSnapshotDecoder::new(resolver, network)),
            config: Arc::new(config),
            metrics,
            event_log,
            route_registry: RouteRegistry::new(),
        }
    }
}
