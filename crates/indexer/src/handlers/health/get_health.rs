use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub network: String,
    pub cached_tokens: usize,
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        network: state.config.network.network.to_string(),
        cached_tokens: state.normalizer.resolver().cached_len(),
    })
}
