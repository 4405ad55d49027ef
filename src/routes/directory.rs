// SPDX-License-Identifier: MIT

//! Gym directory routes.

use crate::error::{AppError, Result};
use crate::models::Gym;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Province shown when a request doesn't name one.
const DEFAULT_PROVINCE: &str = "Quebec";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/gyms", get(list_gyms))
        .route("/api/gyms/search", get(search_gyms))
        .route("/api/gyms/{id}", get(get_gym))
        .route("/api/provinces/{province}/cities", get(list_cities))
        .route("/api/brands", get(list_brands))
}

#[derive(Deserialize)]
struct GymsQuery {
    province: Option<String>,
    city: Option<String>,
}

#[derive(Serialize)]
pub struct GymsResponse {
    pub gyms: Vec<Gym>,
    pub total: u32,
}

/// List gyms for a province, optionally narrowed to a city.
async fn list_gyms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GymsQuery>,
) -> Json<GymsResponse> {
    let province = params.province.as_deref().unwrap_or(DEFAULT_PROVINCE);
    let gyms: Vec<Gym> = state
        .directory
        .gyms_for_province_and_city(province, params.city.as_deref())
        .into_iter()
        .cloned()
        .collect();

    let total = gyms.len() as u32;
    Json(GymsResponse { gyms, total })
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

/// Search gyms by name, brand, or city.
async fn search_gyms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<GymsResponse>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Search query must not be empty".to_string(),
        ));
    }

    let gyms: Vec<Gym> = state.directory.search(query).into_iter().cloned().collect();
    let total = gyms.len() as u32;
    Ok(Json(GymsResponse { gyms, total }))
}

/// Get one gym by id.
async fn get_gym(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Gym>> {
    state
        .directory
        .get_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Gym {} not found", id)))
}

#[derive(Serialize)]
pub struct CitiesResponse {
    pub province: String,
    pub cities: Vec<String>,
}

/// List the cities with gyms in a province.
async fn list_cities(
    State(state): State<Arc<AppState>>,
    Path(province): Path<String>,
) -> Json<CitiesResponse> {
    let cities = state.directory.cities_for_province(&province);
    Json(CitiesResponse { province, cities })
}

#[derive(Serialize)]
pub struct BrandsResponse {
    pub brands: Vec<String>,
}

/// List the distinct brands in the directory.
async fn list_brands(State(state): State<Arc<AppState>>) -> Json<BrandsResponse> {
    Json(BrandsResponse {
        brands: state.directory.brands(),
    })
}
