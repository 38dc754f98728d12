// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{Json, extract::State};
use config::normalize_address;
use serde::Deserialize;
use serde_json::Value;

use crate::abex::VaultSnapshot;
use crate::extractors::JsonBody;
use crate::handlers::IngestError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRequest {
    /// The vault's dynamic-field object
    pub object: Value,
    /// Oracle price of the vault token, `tvl` is zero without it
    #[serde(default)]
    pub usd_price: Option<f64>,
    /// Parent object the dynamic field was read from
    #[serde(default)]
    pub parent: Option<String>,
}

/// Handler for POST /v1/vaults
pub async fn post_vault(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<VaultRequest>,
) -> Result<Json<VaultSnapshot>, IngestError> {
    if let (Some(parent), Some(expected)) = (&request.parent, &state.config.network.vaults_parent)
        && normalize_address(parent).ok() != normalize_address(expected).ok()
    {
        return Err(IngestError::ForeignVault(parent.clone()));
    }

    let snapshot = state.vaults.decode(&request.object).await?;
    state
        .vaults
        .record(&snapshot, request.usd_price, state.metrics.as_ref());

    Ok(Json(snapshot))
}
