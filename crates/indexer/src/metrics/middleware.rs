use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Instant;

use crate::state::AppState;

use super::registry::{
    HTTP_REQUEST_ERROR, HTTP_REQUEST_SUCCESS, HTTP_REQUESTS, REQUEST_DURATION_SECONDS,
};

lazy_static! {
    static ref HEX_SEGMENT: Regex =
        Regex::new(r"/0x[a-fA-F0-9]+").expect("hex segment pattern is valid");
    static ref NUMERIC_SEGMENT: Regex = Regex::new(r"/[0-9]+(/|$)").expect("numeric segment pattern is valid");
}

/// Route label for requests that matched no route.
///
/// Object ids and numbers are collapsed so unmatched paths cannot blow up label
/// cardinality. With `include_query_params` the sorted parameter names are
/// appended: `/v1/x?a=<?>&b=<?>`.
fn normalize_route(path: &str, query_string: Option<&str>, include_query_params: bool) -> String {
    let normalized = HEX_SEGMENT.replace_all(path, "/:id");
    let mut normalized = NUMERIC_SEGMENT.replace_all(&normalized, "/:n$1").to_string();

    if include_query_params
        && let Some(query) = query_string
        && !query.is_empty()
    {
        let mut params: Vec<&str> = query
            .split('&')
            .filter_map(|pair| pair.split('=').next())
            .filter(|name| !name.is_empty())
            .collect();
        params.sort_unstable();

        let query_params = params
            .iter()
            .map(|name| format!("{}=<?>", name))
            .collect::<Vec<_>>()
            .join("&");

        normalized = format!("{}?{}", normalized, query_params);
    }

    normalized
}

/// Metrics middleware for tracking HTTP requests
pub async fn metrics_middleware(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path == "/metrics" || path == "/metrics.json" {
        return next.run(req).await;
    }

    HTTP_REQUESTS.inc();
    let start = Instant::now();

    let method = req.method().to_string();
    let route = match matched_path {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_route(
            path,
            req.uri().query(),
            state.config.metrics.include_queryparams,
        ),
    };

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status();
    let status_code = status.as_u16().to_string();

    if status.is_client_error() || status.is_server_error() {
        HTTP_REQUEST_ERROR.inc();
    } else if status.is_success() {
        HTTP_REQUEST_SUCCESS.inc();
    }

    REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &route, &status_code])
        .observe(duration);

    response
}
