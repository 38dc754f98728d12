//! Where things live inside an event payload.

use serde_json::Value;

use super::error::DecodeError;
use super::numeric::{field, path};

/// Location of the inner position event.
///
/// Claims made directly by the owner carry it at `event`, claims routed through a
/// keeper at `claim.event`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionPayload<'a> {
    Direct(&'a Value),
    Claimed(&'a Value),
    Empty,
}

impl<'a> PositionPayload<'a> {
    pub fn locate(payload: &'a Value) -> Self {
        if let Some(event) = field(payload, "event") {
            PositionPayload::Direct(event)
        } else if let Some(event) = path(payload, &["claim", "event"]) {
            PositionPayload::Claimed(event)
        } else {
            PositionPayload::Empty
        }
    }

    pub fn event(&self) -> Option<&'a Value> {
        match *self {
            PositionPayload::Direct(event) | PositionPayload::Claimed(event) => Some(event),
            PositionPayload::Empty => None,
        }
    }
}

/// `LiquidatePositionEvent` gained `position_size` in a later package version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiquidationSchema<'a> {
    Current { position_size: &'a Value },
    Legacy,
}

impl<'a> LiquidationSchema<'a> {
    pub fn detect(event: &'a Value) -> Self {
        match field(event, "position_size") {
            Some(position_size) => LiquidationSchema::Current { position_size },
            None => LiquidationSchema::Legacy,
        }
    }
}

pub(crate) fn required<'a>(node: &'a Value, name: &'static str) -> Result<&'a Value, DecodeError> {
    field(node, name).ok_or_else(|| DecodeError::missing(name, node))
}

fn text(node: &Value) -> Option<String> {
    match node {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Who the event is attributed to: position owner, order owner, else the sender.
pub fn actor<'a>(payload: &'a Value, sender: &'a str) -> &'a str {
    path(payload, &["position_name", "owner"])
        .or_else(|| path(payload, &["order_name", "owner"]))
        .and_then(Value::as_str)
        .filter(|owner| !owner.is_empty())
        .unwrap_or(sender)
}

pub fn position_id(payload: &Value) -> Option<String> {
    path(payload, &["position_name", "id"])
        .and_then(text)
        .or_else(|| path(payload, &["claim", "position_name", "id"]).and_then(text))
}

pub fn order_id(payload: &Value) -> Option<String> {
    path(payload, &["order_name", "id"]).and_then(text)
}

/// Position an order belongs to
pub fn order_position_id(payload: &Value) -> Option<String> {
    path(payload, &["order_name", "position_id"]).and_then(text)
}
