// SPDX-License-Identifier: MIT

//! Firestore client wrapper implementing [`StatsStore`].
//!
//! Provides typed operations for:
//! - Activities (raw event slices, read-only)
//! - Users (profile reads, field-masked score patches)
//! - Teams (read-only registry)
//! - Daily aggregates and leaderboards (pipeline output)

use crate::db::{collections, SpliceOutcome, StatsStore};
use crate::error::AppError;
use crate::models::{
    ActivityEvent, DailyAggregate, Leaderboard, ProfileScorePatch, Team, TeamEntry,
    TeamLeaderboard, UserProfile,
};
use crate::services::ranking;
use crate::time_utils;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use std::collections::HashMap;

// Firestore caps id-list lookups at 10 values, so profile fetches are
// chunked to 10 ids; each chunk is resolved with concurrent point reads.
const PROFILE_CHUNK_SIZE: usize = 10;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl StatsStore for FirestoreDb {
    async fn events_in_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<ActivityEvent>, AppError> {
        let start = start.to_string();
        let end = end.to_string();

        self.client
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("timestamp").greater_than_or_equal(start.clone()),
                    q.field("timestamp").less_than_or_equal(end.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn profiles_by_ids(
        &self,
        uids: &[String],
    ) -> Result<HashMap<String, UserProfile>, AppError> {
        let client = &self.client;
        let mut profiles = HashMap::with_capacity(uids.len());

        // Sequential chunks; the point reads within a chunk run concurrently.
        // A missing profile is not an error, the id is just absent from the
        // map.
        for chunk in uids.chunks(PROFILE_CHUNK_SIZE) {
            let fetched = stream::iter(chunk.to_vec())
                .map(|uid| async move {
                    let profile: Option<UserProfile> = client
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&uid)
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                    Ok::<_, AppError>(profile.map(|p| (uid, p)))
                })
                .buffer_unordered(PROFILE_CHUNK_SIZE)
                .collect::<Vec<Result<Option<(String, UserProfile)>, AppError>>>()
                .await
                .into_iter()
                .collect::<Result<Vec<Option<(String, UserProfile)>>, AppError>>()?;

            profiles.extend(fetched.into_iter().flatten());
        }

        Ok(profiles)
    }

    async fn list_teams(&self) -> Result<HashMap<String, Team>, AppError> {
        let teams: Vec<Team> = self
            .client
            .fluent()
            .select()
            .from(collections::TEAMS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(teams.into_iter().map(|t| (t.id.clone(), t)).collect())
    }

    async fn get_team(&self, team_id: &str) -> Result<Option<Team>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::TEAMS)
            .obj()
            .one(team_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_daily_aggregates(&self, batch: &[DailyAggregate]) -> Result<(), AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for aggregate in batch {
            self.client
                .fluent()
                .update()
                .in_col(collections::DAILY_AGGREGATES)
                .document_id(aggregate.doc_id())
                .object(aggregate)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add aggregate to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Aggregate batch commit failed: {}", e)))?;

        Ok(())
    }

    async fn set_leaderboard(&self, board: &Leaderboard) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::LEADERBOARDS)
            .document_id(&board.date)
            .object(board)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn set_team_leaderboard(&self, board: &TeamLeaderboard) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::TEAM_LEADERBOARDS)
            .document_id(&board.date)
            .object(board)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn sync_profile_scores(
        &self,
        patches: &[(String, ProfileScorePatch)],
    ) -> Result<(), AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for (uid, patch) in patches {
            // Field mask keeps the rest of the profile untouched.
            self.client
                .fluent()
                .update()
                .fields(firestore::paths!(ProfileScorePatch::{
                    wellness_score,
                    last_active,
                    last_aggregated_date
                }))
                .in_col(collections::USERS)
                .document_id(uid)
                .object(patch)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add score patch to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Score sync batch commit failed: {}", e)))?;

        Ok(())
    }

    async fn aggregates_for_team(
        &self,
        team_id: &str,
        date: &str,
    ) -> Result<Vec<DailyAggregate>, AppError> {
        let team_id = team_id.to_string();
        let date = date.to_string();

        self.client
            .fluent()
            .select()
            .from(collections::DAILY_AGGREGATES)
            .filter(move |q| {
                q.for_all([
                    q.field("team_id").eq(team_id.clone()),
                    q.field("date").eq(date.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn splice_team_entry(
        &self,
        date: &str,
        entry: TeamEntry,
    ) -> Result<SpliceOutcome, AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // The read must go through the transaction's consistency selector so
        // the document lands in its read set. The commit then validates it:
        // a concurrent splice of the same per-date document aborts this one
        // instead of silently losing its re-rank.
        let tx_client = self.client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let board: Option<TeamLeaderboard> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::TEAM_LEADERBOARDS)
            .obj()
            .one(date)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read team leaderboard: {}", e))
            })?;

        let Some(mut board) = board else {
            let _ = transaction.rollback().await;
            return Ok(SpliceOutcome::MissingBoard);
        };

        let Some(position) = board.entries.iter().position(|e| e.team_id == entry.team_id)
        else {
            let _ = transaction.rollback().await;
            return Ok(SpliceOutcome::MissingEntry);
        };

        board.entries[position] = entry;
        ranking::rank_teams(&mut board.entries);
        board.last_updated = time_utils::format_utc_rfc3339(chrono::Utc::now());

        self.client
            .fluent()
            .update()
            .in_col(collections::TEAM_LEADERBOARDS)
            .document_id(&board.date)
            .object(&board)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add leaderboard to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(SpliceOutcome::Updated)
    }
}
