// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded concurrency for batch processing.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Runs at most `max_concurrent` tasks at once and collects their results in
/// input order.
///
/// Short-circuits on the first `Err`; tasks still queued are dropped.
pub async fn run_with_concurrency_collect<F, T, E>(
    max_concurrent: usize,
    tasks: impl IntoIterator<Item = F>,
) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut futs = FuturesUnordered::new();

    for (idx, task) in tasks.into_iter().enumerate() {
        let sem = semaphore.clone();
        futs.push(async move {
            // The semaphore is never closed, so a permit is always granted.
            let _permit = sem.acquire().await.ok();
            task.await.map(|val| (idx, val))
        });
    }

    let mut indexed_results = Vec::with_capacity(futs.len());
    while let Some(result) = futs.next().await {
        indexed_results.push(result?);
    }
    indexed_results.sort_by_key(|(idx, _)| *idx);
    Ok(indexed_results.into_iter().map(|(_, val)| val).collect())
}
