// SPDX-License-Identifier: MIT

//! Trigger routes for the scheduler and administrative callers.
//!
//! These endpoints are called by Cloud Scheduler (via Cloud Tasks) or an
//! authorized admin, never directly by end users.

use crate::config::SCHEDULER_QUEUE_NAME;
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

/// Trigger routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/aggregate-daily", post(aggregate_daily))
        .route("/tasks/update-team-totals", post(update_team_totals))
}

/// Payload for the daily aggregation trigger. The date is optional and
/// defaults to yesterday in the reference time zone.
#[derive(Debug, Deserialize)]
pub struct AggregateDailyPayload {
    #[serde(default)]
    pub date: Option<String>,
}

/// Payload for the incremental team update trigger.
#[derive(Debug, Deserialize)]
pub struct UpdateTeamTotalsPayload {
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub date: String,
}

/// Security check: ensure the request came through our scheduler queue.
/// Cloud Run strips this header from external requests, so its presence
/// guarantees internal origin.
fn is_scheduler_request(headers: &HeaderMap) -> bool {
    headers
        .get("x-cloudtasks-queuename")
        .and_then(|h| h.to_str().ok())
        .map(|name| name == SCHEDULER_QUEUE_NAME)
        .unwrap_or(false)
}

/// Run the daily aggregation (called by the scheduler, or manually with an
/// explicit date to recompute a past day).
async fn aggregate_daily(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AggregateDailyPayload>,
) -> Response {
    if !is_scheduler_request(&headers) {
        tracing::warn!("Blocked unauthorized access to aggregate_daily");
        return StatusCode::FORBIDDEN.into_response();
    }

    let target_date = match &payload.date {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return AppError::BadRequest(format!("Invalid date: {}", raw)).into_response()
            }
        },
        None => None,
    };

    match state.aggregation.run_daily_aggregation(target_date).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Daily aggregation failed");
            e.into_response()
        }
    }
}

/// Recompute one team's totals for a date (administrative trigger).
async fn update_team_totals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateTeamTotalsPayload>,
) -> Response {
    if !is_scheduler_request(&headers) {
        tracing::warn!("Blocked unauthorized access to update_team_totals");
        return StatusCode::FORBIDDEN.into_response();
    }

    if payload.team_id.is_empty() {
        return AppError::BadRequest("Team ID and date are required".to_string()).into_response();
    }
    if NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d").is_err() {
        return AppError::BadRequest(format!("Invalid date: {}", payload.date)).into_response();
    }

    match state
        .team_totals
        .update_team_totals(&payload.team_id, &payload.date)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::error!(
                team_id = %payload.team_id,
                date = %payload.date,
                error = %e,
                "Team totals update failed"
            );
            e.into_response()
        }
    }
}
