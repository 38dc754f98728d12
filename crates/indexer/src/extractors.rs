// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Custom Axum extractors that return JSON error responses.

use async_trait::async_trait;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

/// A wrapper around [`Json<T>`] whose rejections are `{"error": "..."}` JSON.
///
/// The status of the underlying rejection is kept: 400 for syntax errors, 415 for a
/// missing `Content-Type`, 422 when the body does not fit `T`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_body_error(rejection)),
        }
    }
}

fn json_body_error(rejection: JsonRejection) -> Response {
    (
        rejection.status(),
        Json(json!({ "error": rejection.body_text() })),
    )
        .into_response()
}
