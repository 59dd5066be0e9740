use uuid::Uuid;

/// Published after a reservation row has been committed.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationCreatedEvent {
    pub reservation_id: Uuid,
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub user_id: String,
    pub timestamp: i64,
}

/// Published after a reservation row has been deleted by its owner.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationCancelledEvent {
    pub reservation_id: Uuid,
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub user_id: String,
    pub timestamp: i64,
}

impl ReservationCreatedEvent {
    pub const TOPIC: &'static str = "reservations.created";
}

impl ReservationCancelledEvent {
    pub const TOPIC: &'static str = "reservations.cancelled";
}
