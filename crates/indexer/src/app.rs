use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    logging::http_logger_middleware,
    metrics::metrics_middleware,
    routes::{self, API_VERSION},
    state::AppState,
};

/// Largest accepted request body; batches of a few thousand events fit.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    let registry = state.route_registry.clone();

    let v1 = Router::new()
        .merge(routes::health::routes(&registry))
        .merge(routes::events::routes(&registry))
        .merge(routes::vaults::routes(&registry));

    let mut app = Router::new()
        .merge(routes::root::routes(&registry))
        .nest(API_VERSION, v1);

    if state.config.metrics.enabled {
        app = app
            .merge(routes::metrics::routes(&registry))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                metrics_middleware,
            ));
    }

    app.layer(middleware::from_fn(http_logger_middleware))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
