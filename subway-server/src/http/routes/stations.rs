//! Station endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use super::StationResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, StationIdPath};
use crate::state::AppState;

/// Create station request
#[derive(Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
}

/// POST /stations - create a station
async fn create_station(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateStationRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<StationResponse>), ApiError> {
    let station = state.stations.create(&req.name).await?;
    let location = station
        .id()
        .map(|id| format!("/stations/{}", id))
        .unwrap_or_default();

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(StationResponse::from(&station)),
    ))
}

/// GET /stations - list all stations
async fn list_stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StationResponse>>, ApiError> {
    let stations = state.stations.list().await?;
    Ok(Json(stations.iter().map(StationResponse::from).collect()))
}

/// DELETE /stations/{id} - delete a station no line uses
async fn delete_station(
    State(state): State<Arc<AppState>>,
    StationIdPath(id): StationIdPath,
) -> Result<StatusCode, ApiError> {
    state.stations.delete(id).await?;
    Ok(StatusCode::OK)
}

/// Station routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stations", get(list_stations).post(create_station))
        .route("/stations/{id}", delete(delete_station))
}
