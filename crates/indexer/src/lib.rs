// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod abex;
pub mod app;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod utils;

#[cfg(test)]
pub mod test_fixtures;
