// SPDX-License-Identifier: MIT

//! Shared test fixtures: an in-memory [`StatsStore`] fake and model builders.

#![allow(dead_code)]

use async_trait::async_trait;
use fitsync_stats::db::{SpliceOutcome, StatsStore};
use fitsync_stats::error::AppError;
use fitsync_stats::models::{
    ActivityEvent, ActivityKind, DailyAggregate, Leaderboard, ProfileScorePatch, Team, TeamEntry,
    TeamLeaderboard, UserProfile,
};
use fitsync_stats::services::ranking;
use std::collections::HashMap;
use std::sync::Mutex;

/// Backing data for the in-memory store.
#[derive(Default)]
pub struct MemoryData {
    pub events: Vec<ActivityEvent>,
    pub profiles: HashMap<String, UserProfile>,
    pub teams: HashMap<String, Team>,
    pub aggregates: HashMap<String, DailyAggregate>,
    pub leaderboards: HashMap<String, Leaderboard>,
    pub team_leaderboards: HashMap<String, TeamLeaderboard>,

    /// Batch commit counters, for asserting chunking behavior.
    pub aggregate_batches_committed: usize,
    pub score_batches_committed: usize,

    /// When set, the aggregate batch with this zero-based index fails,
    /// leaving earlier batches committed.
    pub fail_aggregate_batch_at: Option<usize>,

    /// Same knob for the profile score sync batches.
    pub fail_score_batch_at: Option<usize>,
}

/// In-memory fake of the Firestore-backed store.
#[derive(Default)]
pub struct MemoryStore {
    pub data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(f: impl FnOnce(&mut MemoryData)) -> Self {
        let store = Self::default();
        f(&mut store.data.lock().unwrap());
        store
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn events_in_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<ActivityEvent>, AppError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .events
            .iter()
            .filter(|e| e.timestamp.as_str() >= start && e.timestamp.as_str() <= end)
            .cloned()
            .collect())
    }

    async fn profiles_by_ids(
        &self,
        uids: &[String],
    ) -> Result<HashMap<String, UserProfile>, AppError> {
        let data = self.data.lock().unwrap();
        Ok(uids
            .iter()
            .filter_map(|uid| data.profiles.get(uid).map(|p| (uid.clone(), p.clone())))
            .collect())
    }

    async fn list_teams(&self) -> Result<HashMap<String, Team>, AppError> {
        Ok(self.data.lock().unwrap().teams.clone())
    }

    async fn get_team(&self, team_id: &str) -> Result<Option<Team>, AppError> {
        Ok(self.data.lock().unwrap().teams.get(team_id).cloned())
    }

    async fn upsert_daily_aggregates(&self, batch: &[DailyAggregate]) -> Result<(), AppError> {
        let mut data = self.data.lock().unwrap();

        if data.fail_aggregate_batch_at == Some(data.aggregate_batches_committed) {
            return Err(AppError::Database(
                "injected aggregate batch failure".to_string(),
            ));
        }

        for aggregate in batch {
            data.aggregates
                .insert(aggregate.doc_id(), aggregate.clone());
        }
        data.aggregate_batches_committed += 1;
        Ok(())
    }

    async fn set_leaderboard(&self, board: &Leaderboard) -> Result<(), AppError> {
        self.data
            .lock()
            .unwrap()
            .leaderboards
            .insert(board.date.clone(), board.clone());
        Ok(())
    }

    async fn set_team_leaderboard(&self, board: &TeamLeaderboard) -> Result<(), AppError> {
        self.data
            .lock()
            .unwrap()
            .team_leaderboards
            .insert(board.date.clone(), board.clone());
        Ok(())
    }

    async fn sync_profile_scores(
        &self,
        patches: &[(String, ProfileScorePatch)],
    ) -> Result<(), AppError> {
        let mut data = self.data.lock().unwrap();

        if data.fail_score_batch_at == Some(data.score_batches_committed) {
            return Err(AppError::Database(
                "injected score batch failure".to_string(),
            ));
        }

        for (uid, patch) in patches {
            if let Some(profile) = data.profiles.get_mut(uid) {
                profile.wellness_score = patch.wellness_score;
                profile.last_active = patch.last_active.clone();
                profile.last_aggregated_date = Some(patch.last_aggregated_date.clone());
            }
        }
        data.score_batches_committed += 1;
        Ok(())
    }

    async fn aggregates_for_team(
        &self,
        team_id: &str,
        date: &str,
    ) -> Result<Vec<DailyAggregate>, AppError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .aggregates
            .values()
            .filter(|a| a.team_id.as_deref() == Some(team_id) && a.date == date)
            .cloned()
            .collect())
    }

    async fn splice_team_entry(
        &self,
        date: &str,
        entry: TeamEntry,
    ) -> Result<SpliceOutcome, AppError> {
        let mut data = self.data.lock().unwrap();

        let Some(board) = data.team_leaderboards.get_mut(date) else {
            return Ok(SpliceOutcome::MissingBoard);
        };

        let Some(position) = board.entries.iter().position(|e| e.team_id == entry.team_id)
        else {
            return Ok(SpliceOutcome::MissingEntry);
        };

        board.entries[position] = entry;
        ranking::rank_teams(&mut board.entries);
        Ok(SpliceOutcome::Updated)
    }
}

// ─── Test App ──────────────────────────────────────────────────────────────

/// Build the full router over an in-memory store, for route-level tests.
pub fn create_test_app() -> (axum::Router, std::sync::Arc<MemoryStore>) {
    use fitsync_stats::config::Config;
    use fitsync_stats::services::{AggregationService, TeamTotalsService};
    use fitsync_stats::AppState;
    use std::sync::Arc;

    let store = Arc::new(MemoryStore::new());
    let config = Config::default();
    let state = Arc::new(AppState {
        aggregation: AggregationService::new(store.clone(), config.reference_timezone),
        team_totals: TeamTotalsService::new(store.clone()),
        config,
    });

    (fitsync_stats::routes::create_router(state), store)
}

// ─── Builders ──────────────────────────────────────────────────────────────

pub fn event(uid: &str, kind: ActivityKind, value: u64, timestamp: &str) -> ActivityEvent {
    ActivityEvent {
        uid: uid.to_string(),
        kind,
        value,
        timestamp: timestamp.to_string(),
        team_id: None,
    }
}

pub fn profile(uid: &str, display_name: &str, wellness_score: u32, team_id: Option<&str>) -> UserProfile {
    UserProfile {
        uid: uid.to_string(),
        display_name: display_name.to_string(),
        wellness_score,
        total_steps: 0,
        total_calories: 0,
        total_workouts: 0,
        department: None,
        team_id: team_id.map(String::from),
        last_active: "2024-02-01T00:00:00Z".to_string(),
        last_aggregated_date: None,
    }
}

pub fn team(id: &str, name: &str, members: &[&str]) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        members: members.iter().map(|m| m.to_string()).collect(),
        department: None,
    }
}
