pub mod availability;
pub mod coordinator;
pub mod ledger;

pub use availability::{AdjacencyHint, LayoutCache, SeatAvailabilityView, SeatMap, SeatSlot, SeatState};
pub use coordinator::{AdjacencyPolicy, BookingCoordinator};
pub use ledger::InMemoryReservationLedger;
