// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{Router, routing::post};

use crate::{
    handlers::events,
    routes::{API_VERSION, RegisterRoute, RouteRegistry},
    state::AppState,
};

pub fn routes(registry: &RouteRegistry) -> Router<AppState> {
    Router::new()
        .route_registered(registry, API_VERSION, "/events", "post", post(events::post_event))
        .route_registered(
            registry,
            API_VERSION,
            "/events/batch",
            "post",
            post(events::post_event_batch),
        )
}
