use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use voyage_shared::pii::Masked;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

/// Passenger fields as submitted by the client, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassengerDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub national_id: Masked<String>,
    #[serde(default)]
    pub email: Masked<String>,
    #[serde(default)]
    pub phone: Masked<String>,
}

/// Blank or unrecognized tags become `None` so `validate()` reports them
/// as `InvalidPassengerData` instead of failing deserialization.
fn lenient_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|tag| tag.parse().ok()))
}

/// A validated passenger: name is non-blank and gender is known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passenger {
    pub name: String,
    pub gender: Gender,
    pub national_id: Masked<String>,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

impl PassengerDetails {
    pub fn validate(self) -> Result<Passenger, crate::CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(crate::CoreError::InvalidPassengerData(
                "passenger name is required".to_string(),
            ));
        }
        let gender = self.gender.ok_or_else(|| {
            crate::CoreError::InvalidPassengerData("passenger gender is required".to_string())
        })?;

        Ok(Passenger {
            name: name.to_string(),
            gender,
            national_id: self.national_id,
            email: self.email,
            phone: self.phone,
        })
    }
}

/// What a caller asks the coordinator to book.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub passenger: PassengerDetails,
    #[serde(default)]
    pub payment_method: String,
}

/// A reservation candidate handed to the ledger; id and timestamp are
/// assigned on commit.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: String,
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub passenger: Passenger,
    pub payment_method: String,
}

impl NewReservation {
    pub fn into_reservation(self, id: Uuid, reserved_at: DateTime<Utc>) -> Reservation {
        Reservation {
            id,
            user_id: self.user_id,
            trip_id: self.trip_id,
            seat_number: self.seat_number,
            passenger: self.passenger,
            payment_method: self.payment_method,
            reserved_at,
        }
    }
}

/// A committed seat assignment. Live until its owner cancels it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: String,
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub passenger: Passenger,
    pub payment_method: String,
    pub reserved_at: DateTime<Utc>,
}
