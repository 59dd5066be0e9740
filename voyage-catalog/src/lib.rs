pub mod layout;
pub mod memory;

pub use layout::{SeatLayout, SeatPosition};
pub use memory::InMemoryTripCatalog;
