// SPDX-License-Identifier: MIT

//! Raw activity event model.

use serde::{Deserialize, Serialize};

/// What kind of activity an event records.
///
/// Wire strings match what the event producer writes. `Challenge` and
/// `Wellness` events carry no step/calorie/workout weight; they only count
/// toward the day's event total and last-activity timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Steps,
    Calories,
    Workout,
    Challenge,
    Wellness,
}

/// Raw activity event, as logged by the surrounding application.
///
/// Append-only: the aggregation pipeline only reads time-bounded slices of
/// this collection and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Owning user ID
    pub uid: String,
    /// Event kind
    pub kind: ActivityKind,
    /// Numeric value (steps walked, calories burned, ...)
    pub value: u64,
    /// When the activity happened (RFC3339 UTC, millisecond precision)
    pub timestamp: String,
    /// Team the user belonged to when logging, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}
