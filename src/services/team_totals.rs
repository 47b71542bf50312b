// SPDX-License-Identifier: MIT

//! Incremental single-team re-aggregation.
//!
//! Recomputes one team's totals for one date from the already-persisted
//! daily aggregates and splices the corrected entry into the persisted team
//! leaderboard, re-ranking in place. Does not touch any other team's data.

use crate::db::{SpliceOutcome, StatsStore};
use crate::error::{AppError, Result};
use crate::models::TeamEntry;
use crate::services::ranking::TeamTotals;
use crate::time_utils;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of an incremental team update.
#[derive(Debug, Serialize)]
pub struct TeamUpdateResult {
    pub team_id: String,
    pub date: String,
    pub total_points: u32,
    pub member_count: u32,
    pub average_points: u32,
    /// False when there was nothing to update (no aggregates for the
    /// team/date, or the daily run never created a leaderboard entry to
    /// patch). Those are expected no-ops, not errors.
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TeamUpdateResult {
    fn no_op(team_id: &str, date: &str, message: &str) -> Self {
        Self {
            team_id: team_id.to_string(),
            date: date.to_string(),
            total_points: 0,
            member_count: 0,
            average_points: 0,
            updated: false,
            message: Some(message.to_string()),
        }
    }
}

/// Recomputes team totals on demand.
pub struct TeamTotalsService {
    store: Arc<dyn StatsStore>,
}

impl TeamTotalsService {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store }
    }

    /// Recompute one team's totals for `date` and patch the persisted team
    /// leaderboard.
    ///
    /// Returns a no-op result when no aggregates exist for the team/date.
    /// Fails with [`AppError::NotFound`] when the team id is absent from the
    /// registry, which is a caller mistake rather than missing data.
    pub async fn update_team_totals(&self, team_id: &str, date: &str) -> Result<TeamUpdateResult> {
        let aggregates = self.store.aggregates_for_team(team_id, date).await?;

        if aggregates.is_empty() {
            tracing::info!(team_id, date, "No aggregates for team, nothing to update");
            return Ok(TeamUpdateResult::no_op(
                team_id,
                date,
                "No data found for team on this date",
            ));
        }

        let mut totals = TeamTotals::default();
        for aggregate in &aggregates {
            totals.add_member(aggregate.wellness_score);
        }

        let team = self
            .store
            .get_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", team_id)))?;

        let entry = TeamEntry {
            team_id: team_id.to_string(),
            team_name: team.name,
            total_points: totals.total_points,
            rank: 0,
            member_count: totals.member_count,
            average_points: totals.average_points(),
            department: team.department,
            last_updated: time_utils::format_utc_rfc3339(chrono::Utc::now()),
        };

        let outcome = self.store.splice_team_entry(date, entry).await?;

        let (updated, message) = match outcome {
            SpliceOutcome::Updated => (true, None),
            // Known gap carried over from the daily run's contract: the
            // incremental path can only update entries that run created, it
            // cannot insert new ones or conjure the document itself.
            SpliceOutcome::MissingBoard => (
                false,
                Some("No team leaderboard exists for this date".to_string()),
            ),
            SpliceOutcome::MissingEntry => (
                false,
                Some("Team has no entry in the leaderboard for this date".to_string()),
            ),
        };

        tracing::info!(
            team_id,
            date,
            total_points = totals.total_points,
            member_count = totals.member_count,
            updated,
            "Team totals recomputed"
        );

        Ok(TeamUpdateResult {
            team_id: team_id.to_string(),
            date: date.to_string(),
            total_points: totals.total_points,
            member_count: totals.member_count,
            average_points: totals.average_points(),
            updated,
            message,
        })
    }
}
