use axum::{Router, routing::get};

use crate::{
    handlers::root::root_handler,
    routes::{RegisterRoute, RouteRegistry},
    state::AppState,
};

pub fn routes(registry: &RouteRegistry) -> Router<AppState> {
    Router::new().route_registered(registry, "", "/", "get", get(root_handler))
}
