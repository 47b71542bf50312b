// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod aggregation;
pub mod persistence;
pub mod ranking;
pub mod team_totals;

pub use aggregation::{AggregationReport, AggregationService};
pub use persistence::PersistenceWriter;
pub use team_totals::{TeamTotalsService, TeamUpdateResult};
