//! Root endpoint handler.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// Handler for GET /
///
/// Service metadata and every registered route.
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "listen": format!("{}:{}", config.server.host, config.server.port),
        "network": config.network.network.as_str(),
        "packages": config.network.package_addresses,
        "routes": state.route_registry.routes(),
    }))
}
