// SPDX-License-Identifier: MIT

//! Persistence writer for the computed day.
//!
//! Commits in three phases: aggregate upserts, leaderboard replacement,
//! profile score sync. Each batch is atomic; batches and phases are not
//! mutually atomic. A failure mid-sequence leaves earlier batches durable
//! and surfaces as [`AppError::PartialWrite`]; re-running the aggregation
//! heals the gap because every write is an idempotent upsert or a
//! full-document replace.

use crate::db::StatsStore;
use crate::error::{AppError, Result};
use crate::models::{DailyAggregate, Leaderboard, ProfileScorePatch, TeamLeaderboard};
use std::sync::Arc;

/// Firestore caps batch/transaction writes at 500 operations.
const MAX_BATCH_SIZE: usize = 500;

/// Writes the computed day out in bounded batches.
pub struct PersistenceWriter {
    store: Arc<dyn StatsStore>,
    batch_size: usize,
}

impl PersistenceWriter {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self {
            store,
            batch_size: MAX_BATCH_SIZE,
        }
    }

    /// Override the batch ceiling. Values above the store limit are clamped.
    pub fn with_batch_size(store: Arc<dyn StatsStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    /// Commit a fully computed day: aggregates, both leaderboards, then
    /// profile score patches.
    pub async fn commit_day(
        &self,
        aggregates: &[DailyAggregate],
        leaderboard: &Leaderboard,
        team_leaderboard: &TeamLeaderboard,
        patches: &[(String, ProfileScorePatch)],
    ) -> Result<()> {
        // Phase 1: aggregate upserts, chunked.
        let chunks: Vec<&[DailyAggregate]> = aggregates.chunks(self.batch_size).collect();
        let total = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            self.store
                .upsert_daily_aggregates(chunk)
                .await
                .map_err(|e| partial(index, total, "aggregate upsert", e))?;
        }
        tracing::debug!(
            count = aggregates.len(),
            batches = total,
            "Daily aggregates committed"
        );

        // Phase 2: full-document leaderboard replacement.
        self.store.set_leaderboard(leaderboard).await?;
        self.store.set_team_leaderboard(team_leaderboard).await?;
        tracing::debug!(
            participants = leaderboard.total_participants,
            teams = team_leaderboard.total_teams,
            date = %leaderboard.date,
            "Leaderboards committed"
        );

        // Phase 3: profile score sync, chunked. A failure here does not roll
        // back the aggregates or leaderboards already committed.
        let chunks: Vec<&[(String, ProfileScorePatch)]> = patches.chunks(self.batch_size).collect();
        let total = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            self.store
                .sync_profile_scores(chunk)
                .await
                .map_err(|e| partial(index, total, "profile score sync", e))?;
        }
        tracing::debug!(count = patches.len(), "Profile scores synced");

        Ok(())
    }
}

fn partial(committed: usize, total: usize, phase: &str, err: AppError) -> AppError {
    AppError::PartialWrite {
        committed,
        total,
        message: format!("{} failed: {}", phase, err),
    }
}
