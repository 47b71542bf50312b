// SPDX-License-Identifier: MIT

//! Database layer (Firestore) and the store abstraction the engines run on.

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{
    ActivityEvent, DailyAggregate, Leaderboard, ProfileScorePatch, Team, TeamEntry,
    TeamLeaderboard, UserProfile,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
    pub const USERS: &str = "users";
    pub const TEAMS: &str = "teams";
    /// Daily aggregates (keyed by `{uid}_{date}`)
    pub const DAILY_AGGREGATES: &str = "daily_aggregates";
    /// Individual leaderboards (keyed by date)
    pub const LEADERBOARDS: &str = "leaderboards";
    /// Team leaderboards (keyed by date)
    pub const TEAM_LEADERBOARDS: &str = "team_leaderboards";
}

/// Outcome of splicing a recomputed team entry into a persisted team
/// leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceOutcome {
    /// Entry replaced in place and the whole list re-ranked.
    Updated,
    /// No team leaderboard document exists for that date; nothing to patch.
    /// The daily run is the only path that creates the document.
    MissingBoard,
    /// The document exists but has no entry for this team. New teams cannot
    /// be inserted through the incremental path, only existing entries
    /// updated.
    MissingEntry,
}

/// Read/write capability over the collections the pipeline touches.
///
/// The engines receive this at construction instead of holding a concrete
/// client, so tests can supply an in-memory fake. Each batch-write method
/// commits one atomic batch; chunking to the store's 500-operation ceiling
/// is the persistence writer's job.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// All activity events with `start <= timestamp <= end` (RFC3339 UTC
    /// strings, millisecond precision), in stored order.
    async fn events_in_range(&self, start: &str, end: &str)
        -> Result<Vec<ActivityEvent>, AppError>;

    /// Fetch profiles for the given user IDs, keyed by ID. IDs with no
    /// profile document are simply absent from the result.
    async fn profiles_by_ids(
        &self,
        uids: &[String],
    ) -> Result<HashMap<String, UserProfile>, AppError>;

    /// All teams, keyed by ID.
    async fn list_teams(&self) -> Result<HashMap<String, Team>, AppError>;

    /// One team by ID.
    async fn get_team(&self, team_id: &str) -> Result<Option<Team>, AppError>;

    /// Upsert one batch of daily aggregates atomically, keyed by
    /// [`DailyAggregate::doc_id`].
    async fn upsert_daily_aggregates(&self, batch: &[DailyAggregate]) -> Result<(), AppError>;

    /// Replace the individual leaderboard document for its date.
    async fn set_leaderboard(&self, board: &Leaderboard) -> Result<(), AppError>;

    /// Replace the team leaderboard document for its date.
    async fn set_team_leaderboard(&self, board: &TeamLeaderboard) -> Result<(), AppError>;

    /// Apply one batch of wellness-score patches to user profiles atomically.
    /// Touches only the patch fields, not the whole profile.
    async fn sync_profile_scores(
        &self,
        patches: &[(String, ProfileScorePatch)],
    ) -> Result<(), AppError>;

    /// All daily aggregates for one team on one date.
    async fn aggregates_for_team(
        &self,
        team_id: &str,
        date: &str,
    ) -> Result<Vec<DailyAggregate>, AppError>;

    /// Transactionally replace one entry in the team leaderboard for `date`
    /// and re-rank the embedded list.
    ///
    /// Must be a read-modify-conditional-write: concurrent calls for
    /// different teams race on the same per-date document, and a plain
    /// read-then-write would lose one caller's update.
    async fn splice_team_entry(
        &self,
        date: &str,
        entry: TeamEntry,
    ) -> Result<SpliceOutcome, AppError>;
}
