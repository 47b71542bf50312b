// SPDX-License-Identifier: MIT

//! FitSync Stats: daily activity aggregation and ranked leaderboards.
//!
//! This crate provides the backend pipeline that rolls raw activity events
//! up into per-user daily aggregates with a blended wellness score, ranks
//! them into individual and team leaderboards, and persists everything in
//! bounded idempotent batches. It also exposes the incremental path that
//! re-aggregates a single team for a date on demand.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{AggregationService, TeamTotalsService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub aggregation: AggregationService,
    pub team_totals: TeamTotalsService,
}
