pub mod events;

pub use events::{ReservationCancelledEvent, ReservationCreatedEvent};
