// SPDX-License-Identifier: MIT

//! Daily statistics aggregation engine.
//!
//! Rolls one calendar day of raw activity events up into per-user daily
//! aggregates and a wellness score, then hands the result to the ranking
//! engine and the persistence writer. The whole day is computed in memory
//! before anything is written, so a failed bulk read never leaves partial
//! output behind.

use crate::db::StatsStore;
use crate::error::Result;
use crate::models::{
    ActivityEvent, ActivityKind, ActivityTotals, DailyAggregate, Leaderboard, LeaderboardEntry,
    ProfileScorePatch, TeamLeaderboard,
};
use crate::services::persistence::PersistenceWriter;
use crate::services::ranking::{self, TeamTotals};
use crate::time_utils;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a daily aggregation run.
#[derive(Debug, Serialize)]
pub struct AggregationReport {
    pub date: String,
    pub processed_users: usize,
    pub processed_teams: usize,
    /// Users that had events but no profile document. Not retried; they
    /// resolve themselves once the profile exists before the next run.
    pub skipped_users: Vec<String>,
}

/// Runs the daily aggregation pipeline against an injected store.
pub struct AggregationService {
    store: Arc<dyn StatsStore>,
    writer: PersistenceWriter,
    reference_timezone: Tz,
}

impl AggregationService {
    pub fn new(store: Arc<dyn StatsStore>, reference_timezone: Tz) -> Self {
        let writer = PersistenceWriter::new(store.clone());
        Self {
            store,
            writer,
            reference_timezone,
        }
    }

    /// Replace the default persistence writer (tests use small batch sizes).
    pub fn with_writer(mut self, writer: PersistenceWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Aggregate one calendar day. Defaults to "yesterday" in the reference
    /// time zone when no date is given.
    ///
    /// Safe to re-run for the same date: every write is an idempotent
    /// upsert or a full-document replace.
    pub async fn run_daily_aggregation(
        &self,
        target_date: Option<NaiveDate>,
    ) -> Result<AggregationReport> {
        let date =
            target_date.unwrap_or_else(|| time_utils::yesterday_in(self.reference_timezone));
        let date_string = date.format("%Y-%m-%d").to_string();

        let (window_start, window_end) = time_utils::day_window(date, self.reference_timezone);
        let start = time_utils::format_utc_millis(window_start);
        let end = time_utils::format_utc_millis(window_end);

        tracing::info!(date = %date_string, %start, %end, "Starting daily aggregation");

        let events = self.store.events_in_range(&start, &end).await?;
        tracing::info!(date = %date_string, count = events.len(), "Fetched activity events");

        // No early return on an empty day: the per-date leaderboard
        // documents are still written, with zero entries, so readers always
        // find a document for every aggregated date.

        // Group by user, preserving first-seen order. That order is the
        // tie-break order for equal scores after the stable sort.
        let mut user_order: Vec<String> = Vec::new();
        let mut events_by_user: HashMap<String, Vec<ActivityEvent>> = HashMap::new();
        for event in events {
            if !events_by_user.contains_key(&event.uid) {
                user_order.push(event.uid.clone());
            }
            events_by_user.entry(event.uid.clone()).or_default().push(event);
        }

        let profiles = self.store.profiles_by_ids(&user_order).await?;
        let teams = self.store.list_teams().await?;

        let now = time_utils::format_utc_rfc3339(chrono::Utc::now());

        let mut aggregates: Vec<DailyAggregate> = Vec::new();
        let mut entries: Vec<LeaderboardEntry> = Vec::new();
        let mut skipped_users: Vec<String> = Vec::new();
        let mut team_order: Vec<String> = Vec::new();
        let mut team_totals: HashMap<String, TeamTotals> = HashMap::new();

        for uid in &user_order {
            let Some(profile) = profiles.get(uid) else {
                tracing::warn!(uid = %uid, date = %date_string, "No profile for active user, skipping");
                skipped_users.push(uid.clone());
                continue;
            };

            let user_events = &events_by_user[uid];
            let totals = fold_events(user_events);
            let score = wellness_score(
                totals.steps,
                totals.calories,
                totals.workouts,
                profile.wellness_score,
            );

            aggregates.push(DailyAggregate {
                uid: uid.clone(),
                display_name: profile.display_name.clone(),
                date: date_string.clone(),
                total_steps: totals.steps,
                total_calories: totals.calories,
                total_workouts: totals.workouts,
                wellness_score: score,
                department: profile.department.clone(),
                team_id: profile.team_id.clone(),
                activities_count: user_events.len() as u32,
                last_activity: totals.last_activity,
                created_at: now.clone(),
            });

            entries.push(LeaderboardEntry {
                uid: uid.clone(),
                display_name: profile.display_name.clone(),
                total_points: score,
                rank: 0,
                activities: ActivityTotals {
                    steps: totals.steps,
                    calories: totals.calories,
                    workouts: totals.workouts,
                },
                department: profile.department.clone(),
                team_id: profile.team_id.clone(),
                last_updated: now.clone(),
            });

            if let Some(team_id) = &profile.team_id {
                if !team_totals.contains_key(team_id) {
                    team_order.push(team_id.clone());
                }
                team_totals.entry(team_id.clone()).or_default().add_member(score);
            }
        }

        ranking::rank_individuals(&mut entries);

        let mut team_entries = ranking::build_team_entries(&team_order, &team_totals, &teams, &now);
        ranking::rank_teams(&mut team_entries);

        let leaderboard = Leaderboard {
            date: date_string.clone(),
            total_participants: entries.len() as u32,
            entries,
            created_at: now.clone(),
            last_updated: now.clone(),
        };
        let team_leaderboard = TeamLeaderboard {
            date: date_string.clone(),
            total_teams: team_entries.len() as u32,
            entries: team_entries,
            created_at: now.clone(),
            last_updated: now.clone(),
        };

        let patches: Vec<(String, ProfileScorePatch)> = aggregates
            .iter()
            .map(|aggregate| {
                (
                    aggregate.uid.clone(),
                    ProfileScorePatch {
                        wellness_score: aggregate.wellness_score,
                        last_active: now.clone(),
                        last_aggregated_date: date_string.clone(),
                    },
                )
            })
            .collect();

        let processed_users = aggregates.len();
        let processed_teams = team_leaderboard.entries.len();

        self.writer
            .commit_day(&aggregates, &leaderboard, &team_leaderboard, &patches)
            .await?;

        tracing::info!(
            date = %date_string,
            processed_users,
            processed_teams,
            skipped = skipped_users.len(),
            "Daily aggregation completed"
        );

        Ok(AggregationReport {
            date: date_string,
            processed_users,
            processed_teams,
            skipped_users,
        })
    }
}

/// Per-user fold of one day's events.
#[derive(Debug, Default)]
struct DayTotals {
    steps: u64,
    calories: u64,
    workouts: u32,
    last_activity: String,
}

fn fold_events(events: &[ActivityEvent]) -> DayTotals {
    let mut totals = DayTotals::default();
    for event in events {
        match event.kind {
            ActivityKind::Steps => totals.steps += event.value,
            ActivityKind::Calories => totals.calories += event.value,
            ActivityKind::Workout => totals.workouts += 1,
            // Challenge and wellness check-in events carry no daily weight,
            // but still count toward activities_count and last_activity.
            ActivityKind::Challenge | ActivityKind::Wellness => {}
        }
        if event.timestamp > totals.last_activity {
            totals.last_activity = event.timestamp.clone();
        }
    }
    totals
}

/// Blended daily wellness score.
///
/// Caps today's activity contribution and carries 35% of the profile's prior
/// rolling score forward, so an inactive day decays the score toward zero
/// instead of resetting it.
pub fn wellness_score(steps: u64, calories: u64, workouts: u32, prior_score: u32) -> u32 {
    let raw = (steps as f64 / 10_000.0) * 30.0
        + (calories as f64 / 2_000.0) * 20.0
        + f64::from(workouts) * 15.0
        + f64::from(prior_score) * 0.35;

    raw.min(100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_steps_with_carry_over() {
        // 12,000 steps, prior score 50: 30*1.2 + 50*0.35 = 36 + 17.5 = 53.5
        assert_eq!(wellness_score(12_000, 0, 0, 50), 54);
    }

    #[test]
    fn test_score_workouts_only() {
        // Two workouts, no prior score: 2 * 15 = 30
        assert_eq!(wellness_score(0, 0, 2, 0), 30);
    }

    #[test]
    fn test_score_capped_at_100() {
        assert_eq!(wellness_score(1_000_000, 50_000, 20, 100), 100);
    }

    #[test]
    fn test_score_pure_carry_over() {
        // No activity at all still yields 35% of the prior score.
        assert_eq!(wellness_score(0, 0, 0, 80), 28);
    }

    #[test]
    fn test_score_is_bounded() {
        for prior in [0, 50, 100] {
            for steps in [0, 5_000, 100_000] {
                let score = wellness_score(steps, 1_000, 1, prior);
                assert!(score <= 100);
            }
        }
    }

    #[test]
    fn test_fold_events() {
        let events = vec![
            event("u1", ActivityKind::Steps, 4_000, "2024-03-01T08:00:00.000Z"),
            event("u1", ActivityKind::Steps, 8_000, "2024-03-01T18:00:00.000Z"),
            event("u1", ActivityKind::Calories, 500, "2024-03-01T12:00:00.000Z"),
            event("u1", ActivityKind::Workout, 1, "2024-03-01T07:00:00.000Z"),
            event("u1", ActivityKind::Wellness, 5, "2024-03-01T21:00:00.000Z"),
        ];

        let totals = fold_events(&events);
        assert_eq!(totals.steps, 12_000);
        assert_eq!(totals.calories, 500);
        assert_eq!(totals.workouts, 1);
        assert_eq!(totals.last_activity, "2024-03-01T21:00:00.000Z");
    }

    fn event(uid: &str, kind: ActivityKind, value: u64, timestamp: &str) -> ActivityEvent {
        ActivityEvent {
            uid: uid.to_string(),
            kind,
            value,
            timestamp: timestamp.to_string(),
            team_id: None,
        }
    }
}
