// SPDX-License-Identifier: MIT

//! User profile and team models.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The pipeline reads the whole profile but writes back only the wellness
/// score and the last-active/last-aggregated markers; lifetime totals are
/// maintained elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID (also used as document ID)
    pub uid: String,
    /// Display name
    pub display_name: String,
    /// Rolling wellness score, always an integer in 0..=100
    #[serde(default)]
    pub wellness_score: u32,
    /// Lifetime step total
    #[serde(default)]
    pub total_steps: u64,
    /// Lifetime calorie total
    #[serde(default)]
    pub total_calories: u64,
    /// Lifetime workout count
    #[serde(default)]
    pub total_workouts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Last activity timestamp (RFC3339)
    #[serde(default)]
    pub last_active: String,
    /// Most recent date the daily aggregation covered this user (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_aggregated_date: Option<String>,
}

/// The wellness-score fields the persistence writer is allowed to touch.
///
/// Written with a field mask so the rest of the profile is left alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileScorePatch {
    pub wellness_score: u32,
    pub last_active: String,
    pub last_aggregated_date: String,
}

/// Team record, read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Team ID (also used as document ID)
    pub id: String,
    /// Team name
    pub name: String,
    /// Member user IDs
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}
