// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod leaderboard;
pub mod user;

pub use activity::{ActivityEvent, ActivityKind};
pub use leaderboard::{
    ActivityTotals, DailyAggregate, Leaderboard, LeaderboardEntry, TeamEntry, TeamLeaderboard,
};
pub use user::{ProfileScorePatch, Team, UserProfile};
