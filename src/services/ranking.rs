// SPDX-License-Identifier: MIT

//! Leaderboard ranking. Pure transforms, no I/O.
//!
//! Sorting is stable, so equal-point entries keep the order the aggregation
//! engine discovered them in (first seen in the event stream). Ranks are
//! dense and 1-based: ties get distinct consecutive ranks, never a shared
//! rank.

use crate::models::{LeaderboardEntry, Team, TeamEntry};
use std::collections::HashMap;

/// Per-team accumulator filled while folding user aggregates.
#[derive(Debug, Default, Clone)]
pub struct TeamTotals {
    pub total_points: u32,
    pub member_count: u32,
}

impl TeamTotals {
    pub fn add_member(&mut self, points: u32) {
        self.total_points += points;
        self.member_count += 1;
    }

    pub fn average_points(&self) -> u32 {
        if self.member_count == 0 {
            return 0;
        }
        (f64::from(self.total_points) / f64::from(self.member_count)).round() as u32
    }
}

/// Sort individual entries by points descending and assign dense ranks.
pub fn rank_individuals(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = (index + 1) as u32;
    }
}

/// Sort team entries by points descending and assign dense ranks.
pub fn rank_teams(entries: &mut [TeamEntry]) {
    entries.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = (index + 1) as u32;
    }
}

/// Build unranked team entries from accumulated totals.
///
/// `team_order` preserves the first-seen order of teams, which is the
/// tie-break order after the stable sort. Teams missing from the registry
/// are dropped.
pub fn build_team_entries(
    team_order: &[String],
    totals: &HashMap<String, TeamTotals>,
    teams: &HashMap<String, Team>,
    last_updated: &str,
) -> Vec<TeamEntry> {
    team_order
        .iter()
        .filter_map(|team_id| {
            let total = totals.get(team_id)?;
            let team = teams.get(team_id)?;
            Some(TeamEntry {
                team_id: team_id.clone(),
                team_name: team.name.clone(),
                total_points: total.total_points,
                rank: 0,
                member_count: total.member_count,
                average_points: total.average_points(),
                department: team.department.clone(),
                last_updated: last_updated.to_string(),
            })
        })
        .collect()
}
