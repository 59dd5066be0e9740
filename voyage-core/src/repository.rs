use async_trait::async_trait;
use uuid::Uuid;
use crate::reservation::{NewReservation, Reservation};
use crate::search::TripQuery;
use crate::trip::Trip;
use crate::CoreResult;

/// Read-only access to trip listings.
#[async_trait]
pub trait TripCatalog: Send + Sync {
    /// Fails with `TripNotFound` when the id is unknown.
    async fn get_trip(&self, trip_id: Uuid) -> CoreResult<Trip>;

    /// Matching trips ordered by departure time.
    async fn search_trips(&self, query: &TripQuery) -> CoreResult<Vec<Trip>>;
}

/// Result of an atomic check-and-insert against the seat uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(Reservation),
    /// A live reservation already holds (trip, seat). Nothing was written.
    Conflict,
}

/// Durable store of committed reservations and the sole authority on
/// "one live reservation per (trip, seat)".
///
/// Implementations must make `try_commit` and `cancel` indivisible with
/// respect to each other for the same (trip, seat) without serializing
/// unrelated seats behind a single lock.
#[async_trait]
pub trait ReservationLedger: Send + Sync {
    /// Read-committed snapshot, unordered.
    async fn list_by_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Reservation>>;

    /// Newest reservation first.
    async fn list_by_user(&self, user_id: &str) -> CoreResult<Vec<Reservation>>;

    async fn get(&self, reservation_id: Uuid) -> CoreResult<Option<Reservation>>;

    async fn try_commit(&self, candidate: NewReservation) -> CoreResult<CommitOutcome>;

    /// Deletes the reservation and returns the retired record.
    async fn cancel(&self, reservation_id: Uuid, requesting_user_id: &str) -> CoreResult<Reservation>;
}
