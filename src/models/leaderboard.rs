// SPDX-License-Identifier: MIT

//! Daily aggregate and leaderboard models.
//!
//! These documents are owned exclusively by the aggregation pipeline for the
//! date they cover; the daily run replaces them wholesale on every (re-)run.

use serde::{Deserialize, Serialize};

/// Per-user, per-day aggregate. Upserted, keyed by `{uid}_{date}`.
///
/// Only created for users that logged at least one event that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub uid: String,
    /// Display name snapshot at aggregation time
    pub display_name: String,
    /// Calendar day, ISO `YYYY-MM-DD`
    pub date: String,
    pub total_steps: u64,
    pub total_calories: u64,
    pub total_workouts: u32,
    /// Computed daily wellness score, integer in 0..=100
    pub wellness_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Number of source events folded in
    pub activities_count: u32,
    /// Timestamp of the latest contributing event (RFC3339)
    pub last_activity: String,
    /// When this aggregate was written (RFC3339)
    pub created_at: String,
}

impl DailyAggregate {
    /// Deterministic document ID, so recomputation overwrites in place.
    pub fn doc_id(&self) -> String {
        format!("{}_{}", self.uid, self.date)
    }
}

/// Activity subtotals embedded in a leaderboard entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTotals {
    pub steps: u64,
    pub calories: u64,
    pub workouts: u32,
}

/// One user's row in the daily leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub uid: String,
    pub display_name: String,
    /// Points = the daily wellness score
    pub total_points: u32,
    /// Dense 1-based rank, assigned after sorting
    pub rank: u32,
    pub activities: ActivityTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub last_updated: String,
}

/// Daily individual leaderboard document, keyed by date. Fully replaced on
/// each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub date: String,
    pub entries: Vec<LeaderboardEntry>,
    pub total_participants: u32,
    pub created_at: String,
    pub last_updated: String,
}

/// One team's row in the daily team leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEntry {
    pub team_id: String,
    pub team_name: String,
    /// Sum of member wellness scores
    pub total_points: u32,
    /// Dense 1-based rank, assigned after sorting
    pub rank: u32,
    /// Number of members processed that day
    pub member_count: u32,
    /// round(total_points / member_count)
    pub average_points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub last_updated: String,
}

/// Daily team leaderboard document, keyed by date.
///
/// Fully replaced by the daily run; the incremental team updater patches a
/// single entry and re-ranks the embedded list transactionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamLeaderboard {
    pub date: String,
    pub entries: Vec<TeamEntry>,
    pub total_teams: u32,
    pub created_at: String,
    pub last_updated: String,
}
