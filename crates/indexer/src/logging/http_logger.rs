// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Logs every request on the `http` target as "METHOD /path STATUS DURATIONms".
///
/// 2xx/3xx at DEBUG (visible with the `http` log level), 4xx at WARN, 5xx at ERROR.
pub async fn http_logger_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        200..=399 => tracing::debug!(
            target: "http",
            method = %method,
            route = %route,
            status,
            duration_ms,
            "{} {} {} {}ms",
            method,
            path,
            status,
            duration_ms
        ),
        400..=499 => tracing::warn!(
            target: "http",
            method = %method,
            route = %route,
            status,
            duration_ms,
            "{} {} {} {}ms",
            method,
            path,
            status,
            duration_ms
        ),
        _ => tracing::error!(
            target: "http",
            method = %method,
            route = %route,
            status,
            duration_ms,
            "{} {} {} {}ms",
            method,
            path,
            status,
            duration_ms
        ),
    }

    response
}
