use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Bus,
    Plane,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Bus => "BUS",
            VehicleType::Plane => "PLANE",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUS" => Ok(VehicleType::Bus),
            "PLANE" => Ok(VehicleType::Plane),
            other => Err(format!("unknown vehicle type: {}", other)),
        }
    }
}

/// A trip listing as published by the catalog. The engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub departure: String,
    pub destination: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub price_amount: i32,
    pub vehicle_type: VehicleType,
    pub total_seats: u32,
    pub seats_per_row: u32,
    /// Block notation such as "2+1": two seats, aisle, one seat.
    pub seat_layout: String,
    pub company_name: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub stops: Vec<String>,
}

impl Trip {
    pub fn departs_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn contains_seat(&self, seat_number: u32) -> bool {
        (1..=self.total_seats).contains(&seat_number)
    }
}
