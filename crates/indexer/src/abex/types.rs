use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

use super::classify::{Category, EventKind, PositionEventKind};

/// One event as delivered by a Sui full node
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub type_tag: String,

    #[serde(rename = "parsedJson", alias = "payload", default)]
    pub payload: Value,

    #[serde(default)]
    pub sender: String,

    #[serde(rename = "timestampMs", default, deserialize_with = "deserialize_timestamp")]
    pub timestamp_ms: Option<u64>,
}

impl EventEnvelope {
    pub fn new(type_tag: impl Into<String>, payload: Value, sender: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            payload,
            sender: sender.into(),
            timestamp_ms: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Number(u64),
    Text(String),
}

// Sui renders u64 as strings, older tooling sends numbers.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Timestamp>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Timestamp::Number(ms)) => Ok(Some(ms)),
        Some(Timestamp::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limited_index_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_price_threshold: Option<f64>,
}

/// Canonical financial record derived from a single envelope.
///
/// Fields that do not apply to the event kind stay empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub event_name: String,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_kind: Option<PositionEventKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    pub collateral_token: String,
    pub index_token: String,
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_token: Option<String>,
    pub from_token: String,
    pub to_token: String,

    pub volume_usd: f64,
    pub fee_usd: f64,
    pub pnl_usd: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Size of a liquidated position, feeds the liquidation counter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidation_size_usd: Option<f64>,

    pub prices: Prices,
}
