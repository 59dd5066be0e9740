use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use voyage_core::{
    BookingRequest, CommitOutcome, CoreError, CoreResult, NewReservation, Passenger, Reservation,
    ReservationLedger, Trip, TripCatalog,
};
use crate::availability::LayoutCache;

/// Whether mixed-gender adjacent seating is only hinted or also refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyPolicy {
    #[default]
    Advisory,
    Enforce,
}

/// Validates booking requests and drives them into the ledger.
pub struct BookingCoordinator {
    catalog: Arc<dyn TripCatalog>,
    ledger: Arc<dyn ReservationLedger>,
    layouts: LayoutCache,
    policy: AdjacencyPolicy,
}

impl BookingCoordinator {
    pub fn new(catalog: Arc<dyn TripCatalog>, ledger: Arc<dyn ReservationLedger>) -> Self {
        Self {
            catalog,
            ledger,
            layouts: LayoutCache::new(),
            policy: AdjacencyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AdjacencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share resolved layouts with a `SeatAvailabilityView`.
    pub fn with_layout_cache(mut self, layouts: LayoutCache) -> Self {
        self.layouts = layouts;
        self
    }

    pub fn policy(&self) -> AdjacencyPolicy {
        self.policy
    }

    /// Book one seat. A taken seat surfaces as `SeatAlreadyTaken` and is
    /// never retried here; picking another seat is the caller's decision.
    pub async fn book(&self, user_id: &str, request: BookingRequest) -> CoreResult<Reservation> {
        let trip = self.catalog.get_trip(request.trip_id).await?;

        // 1. Seat range, checked before anything reaches the ledger
        if !trip.contains_seat(request.seat_number) {
            return Err(CoreError::SeatOutOfRange {
                seat: request.seat_number,
                total_seats: trip.total_seats,
            });
        }

        // 2. Passenger data
        if user_id.trim().is_empty() {
            return Err(CoreError::InvalidPassengerData("user id is required".to_string()));
        }
        let passenger = request.passenger.validate()?;

        // 3. Optional adjacency policy
        if self.policy == AdjacencyPolicy::Enforce {
            self.check_adjacency(&trip, request.seat_number, &passenger).await?;
        }

        // 4. Atomic commit
        let candidate = NewReservation {
            user_id: user_id.to_string(),
            trip_id: trip.id,
            seat_number: request.seat_number,
            passenger,
            payment_method: request.payment_method,
        };

        match self.ledger.try_commit(candidate).await? {
            CommitOutcome::Committed(reservation) => {
                info!(
                    "Booking confirmed: reservation {} seat {} trip {} user {}",
                    reservation.id, reservation.seat_number, reservation.trip_id, reservation.user_id
                );
                Ok(reservation)
            }
            CommitOutcome::Conflict => {
                warn!("Booking rejected: seat {} on trip {} is taken", request.seat_number, trip.id);
                Err(CoreError::SeatAlreadyTaken {
                    trip_id: trip.id,
                    seat: request.seat_number,
                })
            }
        }
    }

    pub async fn cancel(&self, reservation_id: Uuid, user_id: &str) -> CoreResult<Reservation> {
        self.ledger.cancel(reservation_id, user_id).await
    }

    pub async fn reservations_for(&self, user_id: &str) -> CoreResult<Vec<Reservation>> {
        self.ledger.list_by_user(user_id).await
    }

    /// Reads a snapshot, so two concurrent bookings can still land side by
    /// side. Seat uniqueness does not depend on this check.
    async fn check_adjacency(&self, trip: &Trip, seat: u32, passenger: &Passenger) -> CoreResult<()> {
        let layout = self.layouts.get_or_resolve(trip)?;
        let neighbors = layout.neighbors(seat);
        if neighbors.is_empty() {
            return Ok(());
        }

        let reservations = self.ledger.list_by_trip(trip.id).await?;
        match reservations
            .iter()
            .find(|r| neighbors.contains(&r.seat_number) && r.passenger.gender != passenger.gender)
        {
            Some(r) => Err(CoreError::AdjacencyConflict {
                seat,
                neighbor: r.seat_number,
            }),
            None => Ok(()),
        }
    }
}
