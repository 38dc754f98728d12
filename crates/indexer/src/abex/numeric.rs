// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Decoding of the protocol's fixed-point numbers.
//!
//! Move structs arrive either as typed objects (`{"type": "..::decimal::Decimal",
//! "fields": {"value": "..."}}`) when read from object storage, or flat
//! (`{"value": "..."}`) inside event payloads. Integers are always parsed into a
//! `U256` first; conversion to `f64` happens last.

use primitive_types::U256;
use serde_json::Value;

use super::error::DecodeError;

pub const FIXED_POINT_DECIMALS: u32 = 18;

/// 10^18, the scale of `Decimal`, `Rate` and their signed variants
const ONE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

const DECIMAL_SUFFIX: &str = "::decimal::Decimal";
const RATE_SUFFIX: &str = "::rate::Rate";
const SRATE_SUFFIX: &str = "::srate::SRate";
const SDECIMAL_SUFFIX: &str = "::sdecimal::SDecimal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggedNumeric {
    Decimal(U256),
    Rate(U256),
    SRate { is_positive: bool, magnitude: U256 },
    SDecimal { is_positive: bool, magnitude: U256 },
    Integer(U256),
}

impl TaggedNumeric {
    /// Parse a node, choosing the encoding from its `type` suffix.
    pub fn parse(node: &Value) -> Result<Self, DecodeError> {
        let type_tag = node.get("type").and_then(Value::as_str).unwrap_or_default();

        if type_tag.ends_with(DECIMAL_SUFFIX) {
            Ok(TaggedNumeric::Decimal(unsigned_magnitude(node)?))
        } else if type_tag.ends_with(RATE_SUFFIX) {
            Ok(TaggedNumeric::Rate(unsigned_magnitude(node)?))
        } else if type_tag.ends_with(SRATE_SUFFIX) {
            let (is_positive, magnitude) = signed_parts(node)?;
            Ok(TaggedNumeric::SRate {
                is_positive,
                magnitude,
            })
        } else if type_tag.ends_with(SDECIMAL_SUFFIX) {
            let (is_positive, magnitude) = signed_parts(node)?;
            Ok(TaggedNumeric::SDecimal {
                is_positive,
                magnitude,
            })
        } else {
            Ok(TaggedNumeric::Integer(parse_integer(node)?))
        }
    }

    pub fn to_f64(&self) -> f64 {
        match *self {
            TaggedNumeric::Decimal(raw) | TaggedNumeric::Rate(raw) => scale_down(raw),
            TaggedNumeric::SRate {
                is_positive,
                magnitude,
            }
            | TaggedNumeric::SDecimal {
                is_positive,
                magnitude,
            } => {
                let value = scale_down(magnitude);
                if is_positive { value } else { -value }
            }
            TaggedNumeric::Integer(raw) => u256_to_f64(raw),
        }
    }
}

/// Decode a node of self-describing encoding.
pub fn decode(node: &Value) -> Result<f64, DecodeError> {
    Ok(TaggedNumeric::parse(node)?.to_f64())
}

/// Decode an unsigned `Decimal` or `Rate` whose type is known from the schema.
pub fn decode_decimal(node: &Value) -> Result<f64, DecodeError> {
    Ok(scale_down(unsigned_magnitude(node)?))
}

/// Decode an `SDecimal` or `SRate` whose type is known from the schema.
pub fn decode_signed(node: &Value) -> Result<f64, DecodeError> {
    let (is_positive, magnitude) = signed_parts(node)?;
    let value = scale_down(magnitude);
    Ok(if is_positive { value } else { -value })
}

/// Decode a plain integer amount (string or JSON number), unscaled.
pub fn decode_integer(node: &Value) -> Result<f64, DecodeError> {
    Ok(u256_to_f64(parse_integer(node)?))
}

/// The contents of a Move struct, unwrapping `fields` when present.
pub fn struct_fields(node: &Value) -> &Value {
    node.get("fields").unwrap_or(node)
}

/// Read a struct field through an optional `fields` wrapper.
pub fn field<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    struct_fields(node).get(name).filter(|value| !value.is_null())
}

/// Follow a path of struct fields.
pub fn path<'a>(node: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().try_fold(node, |current, name| field(current, name))
}

fn unsigned_magnitude(node: &Value) -> Result<U256, DecodeError> {
    let value = field(node, "value").ok_or_else(|| DecodeError::missing("value", node))?;
    parse_integer(value)
}

fn signed_parts(node: &Value) -> Result<(bool, U256), DecodeError> {
    let is_positive =
        field(node, "is_positive").ok_or_else(|| DecodeError::missing("is_positive", node))?;
    let is_positive = parse_bool(is_positive)?;

    let magnitude = field(node, "value").ok_or_else(|| DecodeError::missing("value", node))?;
    Ok((is_positive, unsigned_magnitude(magnitude)?))
}

pub(crate) fn parse_bool(node: &Value) -> Result<bool, DecodeError> {
    match node {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) if text == "true" => Ok(true),
        Value::String(text) if text == "false" => Ok(false),
        _ => Err(DecodeError::UnexpectedShape {
            expected: "boolean",
            node: node.clone(),
        }),
    }
}

fn parse_integer(node: &Value) -> Result<U256, DecodeError> {
    let invalid = || DecodeError::InvalidInteger { node: node.clone() };

    match node {
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            U256::from_dec_str(text).map_err(|_| invalid())
        }
        Value::Number(number) => number.as_u64().map(U256::from).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Divide by 10^18 exactly in integers, then convert both parts.
fn scale_down(raw: U256) -> f64 {
    let (whole, fraction) = raw.div_mod(ONE);
    u256_to_f64(whole) + fraction.low_u64() as f64 / 1e18
}

fn u256_to_f64(value: U256) -> f64 {
    if value.bits() <= 128 {
        return value.low_u128() as f64;
    }
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}
