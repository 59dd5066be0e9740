use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;
use voyage_booking::SeatMap;
use voyage_core::{Trip, TripQuery};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct TripSearchResponse {
    pub trips: Vec<Trip>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips/search", post(search_trips))
        .route("/v1/trips/{trip_id}", get(get_trip))
        .route("/v1/trips/{trip_id}/seats", get(get_seat_map))
}

async fn search_trips(
    State(state): State<AppState>,
    Json(query): Json<TripQuery>,
) -> Result<Json<TripSearchResponse>, AppError> {
    let trips = state.catalog.search_trips(&query).await?;
    Ok(Json(TripSearchResponse { trips }))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.catalog.get_trip(trip_id).await?))
}

async fn get_seat_map(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<SeatMap>, AppError> {
    Ok(Json(state.availability.seat_map(trip_id).await?))
}
