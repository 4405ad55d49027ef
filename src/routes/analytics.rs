// SPDX-License-Identifier: MIT

//! Analytics routes. Advanced analytics and the partnership export are
//! gated on the caller's premium entitlement.

use crate::error::{AppError, Result};
use crate::models::analytics::{
    AdvancedAnalytics, CommunityAnalytics, PartnershipExport, PersonalAnalytics,
};
use crate::models::check_in::CheckIn;
use crate::services::analytics::{
    analyze_advanced, analyze_community, analyze_personal, export_partnership_data,
};
use crate::time_utils::now_ms;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analytics/personal", get(get_personal))
        .route("/api/analytics/community", get(get_community))
        .route("/api/analytics/advanced", get(get_advanced))
        .route("/api/partnership/export", get(get_partnership_export))
}

#[derive(Deserialize)]
struct UserQuery {
    /// Defaults to the session's stable client id
    user_id: Option<String>,
}

fn user_check_ins(all: &[CheckIn], user_id: &str) -> Vec<CheckIn> {
    all.iter()
        .filter(|c| c.user_id == user_id)
        .cloned()
        .collect()
}

/// Personal analytics for one user's history.
async fn get_personal(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Json<PersonalAnalytics> {
    let snapshot = state.session.snapshot();
    let user_id = params
        .user_id
        .as_deref()
        .unwrap_or_else(|| state.session.user_id());

    let mine = user_check_ins(&snapshot, user_id);
    Json(analyze_personal(&mine, &state.directory, now_ms()))
}

/// Community analytics across all users (last 24 hours).
async fn get_community(State(state): State<Arc<AppState>>) -> Json<CommunityAnalytics> {
    let snapshot = state.session.snapshot();
    Json(analyze_community(&snapshot, &state.directory, now_ms()))
}

/// Advanced analytics; requires an active subscription.
async fn get_advanced(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<AdvancedAnalytics>> {
    let user_id = params
        .user_id
        .clone()
        .unwrap_or_else(|| state.session.user_id().to_string());
    require_premium(&state, &user_id)?;

    let snapshot = state.session.snapshot();
    let mine = user_check_ins(&snapshot, &user_id);
    let personal = analyze_personal(&mine, &state.directory, now_ms());
    Ok(Json(analyze_advanced(&personal)))
}

/// Anonymized partner export; requires an active subscription.
async fn get_partnership_export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PartnershipExport>> {
    let user_id = params
        .user_id
        .clone()
        .unwrap_or_else(|| state.session.user_id().to_string());
    require_premium(&state, &user_id)?;

    let snapshot = state.session.snapshot();
    let community = analyze_community(&snapshot, &state.directory, now_ms());
    Ok(Json(export_partnership_data(
        &community,
        &snapshot,
        &state.directory,
    )))
}

fn require_premium(state: &AppState, user_id: &str) -> Result<()> {
    if state.entitlements.is_premium(user_id) {
        Ok(())
    } else {
        tracing::debug!(user_id, "Premium surface requested without entitlement");
        Err(AppError::PremiumRequired)
    }
}
