// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event classification by type tag.
//!
//! ABEX emits events such as
//! `0xceab..::market::PositionClaimed<0xceab..::market::PositionName<C, I, D>, 0xceab..::position::OpenPositionSuccessEvent>`.
//! The kind is found by substring match against an ordered table, the token types
//! and direction come from one generic parameter group of the tag.

use serde::Serialize;

use super::error::DecodeError;

/// Top level ABEX market events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum EventKind {
    PositionClaimed,
    Deposited,
    Withdrawn,
    Swapped,
    OrderCreated,
    OrderExecuted,
    OrderCleared,
    ReferralAdded,
    #[default]
    Unknown,
}

/// Evaluated top-down; the first name found in the tag wins.
const EVENT_KINDS: &[(&str, EventKind)] = &[
    ("PositionClaimed", EventKind::PositionClaimed),
    ("Deposited", EventKind::Deposited),
    ("Withdrawn", EventKind::Withdrawn),
    ("Swapped", EventKind::Swapped),
    ("OrderCreated", EventKind::OrderCreated),
    ("OrderExecuted", EventKind::OrderExecuted),
    ("OrderCleared", EventKind::OrderCleared),
    ("ReferralAdded", EventKind::ReferralAdded),
];

/// Metric category of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Position,
    Pool,
    Swap,
    Order,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Position => "Position",
            Category::Pool => "Pool",
            Category::Swap => "Swap",
            Category::Order => "Order",
        }
    }
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        EVENT_KINDS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("Unknown")
    }

    /// Which `<` of the tag opens the token parameter group.
    ///
    /// Pool events are generic over the coins directly (`Swapped<S, D>`), order and
    /// position events wrap them in a name struct (`OrderCreated<OrderName<C, I, D, F>, ..>`).
    pub fn generic_depth(&self) -> Option<usize> {
        match self {
            EventKind::Deposited | EventKind::Withdrawn | EventKind::Swapped => Some(1),
            EventKind::PositionClaimed
            | EventKind::OrderCreated
            | EventKind::OrderExecuted
            | EventKind::OrderCleared => Some(2),
            EventKind::ReferralAdded | EventKind::Unknown => None,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            EventKind::PositionClaimed => Some(Category::Position),
            EventKind::Deposited | EventKind::Withdrawn => Some(Category::Pool),
            EventKind::Swapped => Some(Category::Swap),
            EventKind::OrderCreated | EventKind::OrderExecuted | EventKind::OrderCleared => {
                Some(Category::Order)
            }
            EventKind::ReferralAdded | EventKind::Unknown => None,
        }
    }
}

/// Position events carried inside `PositionClaimed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PositionEventKind {
    OpenPositionSuccess,
    OpenPositionFailed,
    DecreasePositionSuccess,
    DecreasePositionFailed,
    DecreaseReservedFromPosition,
    PledgeInPosition,
    RedeemFromPosition,
    LiquidatePosition,
    #[default]
    Unknown,
}

const POSITION_EVENT_KINDS: &[(&str, PositionEventKind)] = &[
    ("OpenPositionSuccessEvent", PositionEventKind::OpenPositionSuccess),
    ("OpenPositionFailedEvent", PositionEventKind::OpenPositionFailed),
    ("DecreasePositionSuccessEvent", PositionEventKind::DecreasePositionSuccess),
    ("DecreasePositionFailedEvent", PositionEventKind::DecreasePositionFailed),
    (
        "DecreaseReservedFromPositionEvent",
        PositionEventKind::DecreaseReservedFromPosition,
    ),
    ("PledgeInPositionEvent", PositionEventKind::PledgeInPosition),
    ("RedeemFromPositionEvent", PositionEventKind::RedeemFromPosition),
    ("LiquidatePositionEvent", PositionEventKind::LiquidatePosition),
];

impl PositionEventKind {
    pub fn name(&self) -> &'static str {
        POSITION_EVENT_KINDS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub kind: EventKind,
    pub generic_params: Vec<String>,
}

fn match_kind<K: Copy>(type_tag: &str, table: &[(&str, K)]) -> Option<K> {
    table
        .iter()
        .find(|(name, _)| type_tag.contains(name))
        .map(|(_, kind)| *kind)
}

/// Classify an event type tag and pull out its token parameters.
///
/// Unknown tags are not an error. A known kind whose parameter group is missing or
/// unterminated is.
pub fn classify(type_tag: &str) -> Result<ClassifiedEvent, DecodeError> {
    let kind = match_kind(type_tag, EVENT_KINDS).unwrap_or_default();

    let generic_params = match kind.generic_depth() {
        Some(depth) => generic_params(type_tag, depth)?,
        None => Vec::new(),
    };

    Ok(ClassifiedEvent {
        kind,
        generic_params,
    })
}

pub fn classify_position(type_tag: &str) -> PositionEventKind {
    match_kind(type_tag, POSITION_EVENT_KINDS).unwrap_or_default()
}

/// Split the parameter group opened by the `depth`-th `<` of `type_tag`.
///
/// Only top-level commas separate parameters; a parameter that is itself generic
/// is returned verbatim.
pub fn generic_params(type_tag: &str, depth: usize) -> Result<Vec<String>, DecodeError> {
    let malformed = |reason| DecodeError::MalformedTypeTag {
        tag: type_tag.to_string(),
        reason,
    };

    let (open, _) = type_tag
        .match_indices('<')
        .nth(depth.saturating_sub(1))
        .ok_or_else(|| malformed("missing generic parameter group"))?;
    let body = &type_tag[open + 1..];

    let mut params = Vec::new();
    let mut nesting = 0usize;
    let mut segment_start = 0;

    for (idx, ch) in body.char_indices() {
        match ch {
            '<' => nesting += 1,
            '>' if nesting > 0 => nesting -= 1,
            '>' => {
                push_param(&mut params, &body[segment_start..idx]);
                if params.is_empty() {
                    return Err(malformed("empty generic parameter group"));
                }
                return Ok(params);
            }
            ',' if nesting == 0 => {
                push_param(&mut params, &body[segment_start..idx]);
                segment_start = idx + 1;
            }
            _ => {}
        }
    }

    Err(malformed("unterminated generic parameter group"))
}

fn push_param(params: &mut Vec<String>, raw: &str) {
    let param = raw.trim();
    if !param.is_empty() {
        params.push(param.to_string());
    }
}

/// Trade direction encoded as the last path segment, e.g. `0xceab..::market::LONG`.
pub fn direction_of(param: &str) -> &str {
    param.rsplit("::").next().unwrap_or(param)
}
