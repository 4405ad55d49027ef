// SPDX-License-Identifier: MIT

//! Live occupancy and synthetic series routes.

use crate::error::{AppError, Result};
use crate::models::occupancy::{
    confidence_label, is_stale, HeatmapRow, LiveOccupancyReading, PredictionPoint, TrendPoint,
    DEFAULT_STALE_AFTER_MINUTES, HEATMAP_SLOTS,
};
use crate::services::occupancy::best_visit_window;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/gyms/{id}/occupancy", get(get_occupancy))
        .route("/api/gyms/{id}/trend", get(get_trend))
        .route("/api/gyms/{id}/forecast", get(get_forecast))
        .route("/api/gyms/{id}/heatmap", get(get_heatmap))
}

#[derive(Serialize)]
pub struct OccupancyResponse {
    #[serde(flatten)]
    pub reading: LiveOccupancyReading,
    /// Human label for the confidence percentage
    pub confidence_label: String,
    /// Whether the served reading is older than the freshness threshold
    pub stale: bool,
}

/// Get the live blended reading for a gym.
///
/// Runs a refresh; a transient sensor failure falls back to the last
/// committed reading when one exists, so the dashboard keeps showing
/// data between retries.
async fn get_occupancy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OccupancyResponse>> {
    let snapshot = state.session.snapshot();
    let now = Utc::now();

    let reading = match state.refresh.refresh(&id, &snapshot, &state.directory, now).await {
        Ok(Some(fresh)) => fresh,
        // Superseded by a newer refresh: its committed result is current
        Ok(None) => state
            .refresh
            .coordinator()
            .latest(&id)
            .ok_or(AppError::SensorUnreachable)?,
        Err(_) => {
            tracing::warn!(gym_id = %id, "Sensor fetch failed; serving last reading");
            state
                .refresh
                .coordinator()
                .latest(&id)
                .ok_or(AppError::SensorUnreachable)?
        }
    };

    let stale = chrono::DateTime::parse_from_rfc3339(&reading.last_updated_at)
        .map(|updated| {
            is_stale(
                updated.with_timezone(&Utc),
                now,
                DEFAULT_STALE_AFTER_MINUTES,
            )
        })
        .unwrap_or(true);

    Ok(Json(OccupancyResponse {
        confidence_label: confidence_label(reading.confidence).to_string(),
        stale,
        reading,
    }))
}

#[derive(Serialize)]
pub struct TrendResponse {
    pub gym_id: String,
    pub points: Vec<TrendPoint>,
}

/// Synthetic 24-hour occupancy trend.
async fn get_trend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<TrendResponse> {
    Json(TrendResponse {
        gym_id: id,
        points: state.occupancy.trend(Utc::now()),
    })
}

#[derive(Serialize)]
pub struct ForecastResponse {
    pub gym_id: String,
    pub predictions: Vec<PredictionPoint>,
    /// Recommendation for the quietest upcoming slot
    pub best_visit_window: String,
}

/// Synthetic 12-hour forecast with the best-visit recommendation.
async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ForecastResponse> {
    let predictions = state.occupancy.predictions(Utc::now());
    let best_visit_window = best_visit_window(&predictions);
    Json(ForecastResponse {
        gym_id: id,
        predictions,
        best_visit_window,
    })
}

#[derive(Serialize)]
pub struct HeatmapResponse {
    pub gym_id: String,
    pub slot_labels: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

/// Synthetic weekly busyness heatmap.
async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<HeatmapResponse> {
    Json(HeatmapResponse {
        gym_id: id,
        slot_labels: HEATMAP_SLOTS.iter().map(|s| s.to_string()).collect(),
        rows: state.occupancy.weekly_heatmap(),
    })
}
