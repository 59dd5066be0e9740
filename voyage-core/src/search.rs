use serde::Deserialize;
use chrono::NaiveDate;
use crate::trip::{Trip, VehicleType};

#[derive(Debug, Clone, Deserialize)]
pub struct TripQuery {
    pub from: String,
    pub to: String,
    pub date: NaiveDate, // Calendar day only, departure time is not matched
    #[serde(default)]
    pub vehicle_type: Option<VehicleType>,
}

impl TripQuery {
    /// Location names compare case-insensitively and ignore surrounding whitespace.
    pub fn matches(&self, trip: &Trip) -> bool {
        same_place(&trip.departure, &self.from)
            && same_place(&trip.destination, &self.to)
            && trip.date == self.date
            && self.vehicle_type.map_or(true, |v| v == trip.vehicle_type)
    }
}

fn same_place(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
