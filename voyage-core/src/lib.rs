pub mod repository;
pub mod reservation;
pub mod search;
pub mod trip;

pub use repository::{CommitOutcome, ReservationLedger, TripCatalog};
pub use reservation::{
    BookingRequest, Gender, NewReservation, Passenger, PassengerDetails, Reservation,
};
pub use search::TripQuery;
pub use trip::{Trip, VehicleType};

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid seat geometry: {0}")]
    InvalidGeometry(String),

    #[error("Seat {seat} is outside 1..={total_seats}")]
    SeatOutOfRange { seat: u32, total_seats: u32 },

    #[error("Invalid passenger data: {0}")]
    InvalidPassengerData(String),

    #[error("Seat {seat} on trip {trip_id} is already taken")]
    SeatAlreadyTaken { trip_id: Uuid, seat: u32 },

    #[error("Trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Reservation {0} belongs to another user")]
    NotOwner(Uuid),

    #[error("Seat {seat} sits next to seat {neighbor} held by a passenger of a different gender")]
    AdjacencyConflict { seat: u32, neighbor: u32 },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Only transient infrastructure failures are worth retrying; every other
    /// kind is deterministic for the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StorageUnavailable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::TripNotFound(_) | CoreError::ReservationNotFound(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
