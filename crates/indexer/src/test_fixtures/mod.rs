//! Recording sinks, a counting token source and builders for ABEX type tags.

use async_trait::async_trait;
use config::{ABEX_MAINNET_PACKAGE, IndexerConfig, Network, TokenRegistry};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::abex::token::TokenLookupError;
use crate::abex::{
    EventLogSink, EventNormalizer, MetricsSink, NormalizedEvent, StaticRegistry, TokenInfo,
    TokenResolver, TokenSource,
};
use crate::state::AppState;

pub const PKG: &str = ABEX_MAINNET_PACKAGE;
pub const SUI: &str = "0x2::sui::SUI";
pub const USDC: &str =
    "0x5d4b302506645c37ff133b98c4b50a5ae14841659738d6d733d59d0d217a93bf::coin::COIN";
pub const ETH: &str =
    "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

#[derive(Debug, Clone)]
pub struct MetricRecord {
    pub kind: MetricKind,
    pub name: String,
    pub value: f64,
    pub tags: Vec<(String, String)>,
}

impl MetricRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    records: Mutex<Vec<MetricRecord>>,
}

impl RecordingMetrics {
    pub fn records(&self) -> Vec<MetricRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn named(&self, name: &str) -> Vec<MetricRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.name == name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    fn push(&self, kind: MetricKind, name: &str, value: f64, tags: &[(&'static str, String)]) {
        self.records.lock().unwrap().push(MetricRecord {
            kind,
            name: name.to_string(),
            value,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
    }
}

impl MetricsSink for RecordingMetrics {
    fn gauge(&self, name: &str, value: f64, tags: &[(&'static str, String)]) {
        self.push(MetricKind::Gauge, name, value, tags);
    }

    fn counter(&self, name: &str, value: f64, tags: &[(&'static str, String)]) {
        self.push(MetricKind::Counter, name, value, tags);
    }
}

#[derive(Default)]
pub struct RecordingEventLog {
    records: Mutex<Vec<(String, NormalizedEvent)>>,
}

impl RecordingEventLog {
    pub fn actors(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(actor, _)| actor.clone())
            .collect()
    }

    pub fn events(&self) -> Vec<NormalizedEvent> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }
}

impl EventLogSink for RecordingEventLog {
    fn emit(&self, distinct_id: &str, event: &NormalizedEvent) {
        self.records
            .lock()
            .unwrap()
            .push((distinct_id.to_string(), event.clone()));
    }
}

/// Answers from a fixed table and counts every lookup.
pub struct CountingTokenSource {
    tokens: HashMap<String, TokenInfo>,
    calls: AtomicUsize,
}

impl CountingTokenSource {
    pub fn new(tokens: &[(&str, &str, u8)]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(raw, symbol, decimals)| {
                    (
                        raw.to_string(),
                        TokenInfo {
                            symbol: symbol.to_string(),
                            decimals: *decimals,
                        },
                    )
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for CountingTokenSource {
    async fn lookup(&self, raw_type: &str, _network: Network) -> Result<TokenInfo, TokenLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.tokens
            .get(raw_type)
            .cloned()
            .ok_or_else(|| TokenLookupError::NotFound(raw_type.to_string()))
    }
}

pub fn static_resolver() -> Arc<TokenResolver> {
    Arc::new(TokenResolver::new(Arc::new(StaticRegistry::new(
        TokenRegistry::default(),
    ))))
}

pub fn static_normalizer() -> EventNormalizer {
    EventNormalizer::new(static_resolver(), Network::Mainnet)
}

/// App state on the embedded registry with recording sinks
pub fn test_state() -> (AppState, Arc<RecordingMetrics>, Arc<RecordingEventLog>) {
    let metrics = Arc::new(RecordingMetrics::default());
    let event_log = Arc::new(RecordingEventLog::default());
    let state = AppState::with_parts(
        IndexerConfig::default(),
        Arc::new(StaticRegistry::new(TokenRegistry::default())),
        metrics.clone(),
        event_log.clone(),
    );
    (state, metrics, event_log)
}

pub fn decimal(raw: &str) -> Value {
    json!({ "value": raw })
}

pub fn signed(is_positive: bool, raw: &str) -> Value {
    json!({ "is_positive": is_positive, "value": { "value": raw } })
}

/// `PKG::market::<event><params..>`
pub fn pool_tag(event: &str, params: &[&str]) -> String {
    format!("{PKG}::market::{event}<{}>", params.join(", "))
}

pub fn position_tag(collateral: &str, index: &str, direction: &str, position_event: &str) -> String {
    format!(
        "{PKG}::market::PositionClaimed<{PKG}::market::PositionName<{collateral}, {index}, {PKG}::market::{direction}>, {PKG}::position::{position_event}>"
    )
}

pub fn order_tag(event: &str, collateral: &str, index: &str, direction: &str, fee: &str) -> String {
    format!(
        "{PKG}::market::{event}<{PKG}::market::OrderName<{collateral}, {index}, {PKG}::market::{direction}, {fee}>, {PKG}::orders::OpenMarketOrder>"
    )
}

/// A vault dynamic field as returned by `sui_getObject` with `showContent`
pub fn vault_object(coin_type: &str, liquidity: &str, enabled: bool) -> Value {
    json!({
        "type": format!("0x2::dynamic_field::Field<{PKG}::market::VaultName<{coin_type}>, {PKG}::pool::Vault<{coin_type}>>"),
        "fields": {
            "id": { "id": "0x99" },
            "name": {
                "type": format!("{PKG}::market::VaultName<{coin_type}>"),
                "fields": { "dummy_field": false }
            },
            "value": {
                "type": format!("{PKG}::pool::Vault<{coin_type}>"),
                "fields": {
                    "enabled": enabled,
                    "weight": { "type": format!("{PKG}::decimal::Decimal"), "fields": { "value": "250000000000000000" } },
                    "last_update": "1700000000",
                    "liquidity": { "type": format!("{PKG}::decimal::Decimal"), "fields": { "value": liquidity } },
                    "reserved_amount": "2000000",
                    "unrealised_reserving_fee_amount": {
                        "type": format!("{PKG}::decimal::Decimal"),
                        "fields": { "value": "500000000000000000000000" }
                    },
                    "acc_reserving_rate": { "type": format!("{PKG}::rate::Rate"), "fields": { "value": "1000000000000000" } }
                }
            }
        }
    })
}
