// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Liquidity vault snapshots from the vaults dynamic-field objects.

use config::Network;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::classify::generic_params;
use super::error::DecodeError;
use super::numeric::{decode, parse_bool};
use super::payload::required;
use super::sink::{MetricsSink, TOTAL_AMOUNT, TVL, Tags};
use super::token::TokenResolver;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSnapshot {
    pub token: String,
    pub liquidity_amount: f64,
    pub reserved_amount: f64,
    pub unrealised_fee_amount: f64,
    pub acc_reserving_rate: f64,
    pub enabled: bool,
    pub weight: f64,
    pub last_update: f64,
    pub raw_token_type: String,
}

impl VaultSnapshot {
    pub fn total_amount(&self) -> f64 {
        self.liquidity_amount + self.reserved_amount + self.unrealised_fee_amount
    }
}

pub struct VaultSnapshotDecoder {
    resolver: Arc<TokenResolver>,
    network: Network,
}

impl VaultSnapshotDecoder {
    pub fn new(resolver: Arc<TokenResolver>, network: Network) -> Self {
        Self { resolver, network }
    }

    /// Decode `{fields: {name: {type: "..::VaultName<T>"}, value: {fields: {..}}}}`.
    pub async fn decode(&self, raw: &Value) -> Result<VaultSnapshot, DecodeError> {
        let name = required(raw, "name")?;
        let name_type = name
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::missing("type", name))?;

        let raw_token_type = generic_params(name_type, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::MissingTypeParam {
                tag: name_type.to_string(),
                expected: 1,
                found: 0,
            })?;

        let vault = required(raw, "value")?;
        let token = self.resolver.resolve(&raw_token_type, self.network).await;
        let scale = token.scale();

        let amount = |name: &'static str| -> Result<f64, DecodeError> {
            Ok(decode(required(vault, name)?)? / scale)
        };
        let plain = |name: &'static str| -> Result<f64, DecodeError> { decode(required(vault, name)?) };

        Ok(VaultSnapshot {
            liquidity_amount: amount("liquidity")?,
            reserved_amount: amount("reserved_amount")?,
            unrealised_fee_amount: amount("unrealised_reserving_fee_amount")?,
            acc_reserving_rate: plain("acc_reserving_rate")?,
            enabled: parse_bool(required(vault, "enabled")?)?,
            weight: plain("weight")?,
            last_update: plain("last_update")?,
            token: token.symbol,
            raw_token_type,
        })
    }

    /// Emit `total_amount` and `tvl` for one vault; a missing price counts as zero.
    pub fn record(&self, snapshot: &VaultSnapshot, usd_price: Option<f64>, metrics: &dyn MetricsSink) {
        let total = snapshot.total_amount();
        let tags: Tags = vec![("name", snapshot.token.clone())];

        metrics.gauge(TOTAL_AMOUNT, total, &tags);
        metrics.gauge(TVL, total * usd_price.unwrap_or(0.0), &tags);

        tracing::debug!(
            token = %snapshot.token,
            total_amount = total,
            enabled = snapshot.enabled,
            "Recorded vault snapshot"
        );
    }
}
