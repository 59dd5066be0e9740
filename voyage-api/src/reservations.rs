use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use voyage_core::{BookingRequest, CoreError, Reservation};
use voyage_shared::models::events::{ReservationCancelledEvent, ReservationCreatedEvent};
use crate::{
    error::AppError,
    middleware::auth::{customer_auth_middleware, CustomerClaims},
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(create_reservation).get(list_reservations))
        .route("/v1/reservations/{reservation_id}", get(get_reservation).delete(cancel_reservation))
        .route_layer(axum::middleware::from_fn_with_state(state, customer_auth_middleware))
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = state.coordinator.book(claims.user_id(), request).await?;

    if let Some(events) = state.events.clone() {
        let event = ReservationCreatedEvent {
            reservation_id: reservation.id,
            trip_id: reservation.trip_id,
            seat_number: reservation.seat_number,
            user_id: reservation.user_id.clone(),
            timestamp: Utc::now().timestamp(),
        };
        // The seat is committed either way; a lost event is only logged.
        tokio::spawn(async move {
            if let Err(e) = events.reservation_created(&event).await {
                tracing::error!("Failed to publish reservation {} created: {}", event.reservation_id, e);
            }
        });
    }

    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn list_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(state.coordinator.reservations_for(claims.user_id()).await?))
}

async fn get_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .ledger
        .get(reservation_id)
        .await?
        .ok_or(CoreError::ReservationNotFound(reservation_id))?;

    if reservation.user_id != claims.user_id() {
        return Err(CoreError::NotOwner(reservation_id).into());
    }

    Ok(Json(reservation))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(reservation_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let retired = state.coordinator.cancel(reservation_id, claims.user_id()).await?;

    if let Some(events) = state.events.clone() {
        let event = ReservationCancelledEvent {
            reservation_id: retired.id,
            trip_id: retired.trip_id,
            seat_number: retired.seat_number,
            user_id: retired.user_id,
            timestamp: Utc::now().timestamp(),
        };
        tokio::spawn(async move {
            if let Err(e) = events.reservation_cancelled(&event).await {
                tracing::error!("Failed to publish reservation {} cancelled: {}", event.reservation_id, e);
            }
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
