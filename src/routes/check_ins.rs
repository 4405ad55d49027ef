// SPDX-License-Identifier: MIT

//! Check-in submission routes.

use crate::error::{AppError, Result};
use crate::models::check_in::CheckIn;
use crate::services::check_in::{CheckInError, CheckInRejection};
use crate::time_utils::now_ms;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/check-ins", post(submit_check_in))
}

#[derive(Deserialize, Validate)]
pub struct CheckInRequest {
    #[validate(length(min = 1, max = 64))]
    pub gym_id: String,
    /// Defaults to the session's stable client id
    #[validate(length(min = 1, max = 64))]
    pub user_id: Option<String>,
}

/// Machine-readable rejection category.
fn rejection_reason(rejection: &CheckInRejection) -> &'static str {
    match rejection {
        CheckInRejection::RateLimited { .. } => "rate_limited",
        CheckInRejection::OutOfRange { .. } => "out_of_range",
        CheckInRejection::Geolocation(_) => "geolocation",
    }
}

#[derive(Serialize)]
pub struct CheckInResponse {
    pub accepted: bool,
    /// User-facing outcome message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<CheckIn>,
}

/// Submit a check-in for a gym.
///
/// Business rejections (rate limit, geofence, geolocation) come back as a
/// 200 with `accepted: false` and a dismissible message; only unknown
/// gyms and storage failures are errors.
async fn submit_check_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = request
        .user_id
        .as_deref()
        .unwrap_or_else(|| state.session.user_id());

    let outcome = state
        .check_ins
        .submit(&state.session, user_id, &request.gym_id, now_ms())
        .await
        .map_err(|e| match e {
            CheckInError::UnknownGym(id) => AppError::NotFound(format!("Gym {} not found", id)),
            CheckInError::Store(e) => e.into(),
        })?;

    let response = match outcome {
        Ok(check_in) => CheckInResponse {
            accepted: true,
            message: "Checked in. Thanks for keeping the crowd meter honest!".to_string(),
            reason: None,
            check_in: Some(check_in),
        },
        Err(rejection) => CheckInResponse {
            accepted: false,
            message: rejection.to_string(),
            reason: Some(rejection_reason(&rejection)),
            check_in: None,
        },
    };

    Ok(Json(response))
}
