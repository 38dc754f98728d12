// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{Json, extract::State};

use crate::abex::{EventEnvelope, NormalizedEvent};
use crate::extractors::JsonBody;
use crate::handlers::IngestError;
use crate::state::AppState;
use crate::utils::concurrency::run_with_concurrency_collect;

async fn ingest(state: &AppState, envelope: &EventEnvelope) -> Result<NormalizedEvent, IngestError> {
    if !state.config.network.is_bound(&envelope.type_tag) {
        return Err(IngestError::UnboundPackage(envelope.type_tag.clone()));
    }

    let event = state
        .normalizer
        .process(envelope, state.metrics.as_ref(), state.event_log.as_ref())
        .await?;

    tracing::debug!(
        event_name = %event.event_name,
        volume_usd = event.volume_usd,
        fee_usd = event.fee_usd,
        timestamp_ms = ?envelope.timestamp_ms,
        "Event normalized"
    );

    Ok(event)
}

/// Handler for POST /v1/events
pub async fn post_event(
    State(state): State<AppState>,
    JsonBody(envelope): JsonBody<EventEnvelope>,
) -> Result<Json<NormalizedEvent>, IngestError> {
    Ok(Json(ingest(&state, &envelope).await?))
}

/// Handler for POST /v1/events/batch
///
/// Envelopes are processed concurrently and answered in input order. The first
/// failure fails the request; envelopes already processed keep their emissions.
pub async fn post_event_batch(
    State(state): State<AppState>,
    JsonBody(envelopes): JsonBody<Vec<EventEnvelope>>,
) -> Result<Json<Vec<NormalizedEvent>>, IngestError> {
    if envelopes.is_empty() {
        return Err(IngestError::EmptyBatch);
    }

    let events = run_with_concurrency_collect(
        state.config.batch_concurrency,
        envelopes.iter().map(|envelope| ingest(&state, envelope)),
    )
    .await?;

    tracing::debug!(count = events.len(), "Batch normalized");
    Ok(Json(events))
}
