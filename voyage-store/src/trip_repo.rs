use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use voyage_core::{CoreError, CoreResult, Trip, TripCatalog, TripQuery};
use crate::storage_error;

const TRIP_COLUMNS: &str = "id, departure, destination, trip_date, trip_time, price_amount, vehicle_type, \
     total_seats, seats_per_row, seat_layout, company_name, duration_minutes, features, stops";

/// Read-only view of the `trips` table. Listings are maintained elsewhere.
pub struct PostgresTripCatalog {
    pool: PgPool,
}

impl PostgresTripCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    departure: String,
    destination: String,
    trip_date: NaiveDate,
    trip_time: NaiveTime,
    price_amount: i32,
    vehicle_type: String,
    total_seats: i32,
    seats_per_row: i32,
    seat_layout: String,
    company_name: String,
    duration_minutes: i32,
    features: Vec<String>,
    stops: Vec<String>,
}

impl TryFrom<TripRow> for Trip {
    type Error = CoreError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let vehicle_type = row
            .vehicle_type
            .parse()
            .map_err(|e| CoreError::InternalError(format!("trip {}: {}", row.id, e)))?;

        // Negative counts collapse to 0 and are rejected by geometry resolution.
        Ok(Trip {
            id: row.id,
            departure: row.departure,
            destination: row.destination,
            date: row.trip_date,
            time: row.trip_time,
            price_amount: row.price_amount,
            vehicle_type,
            total_seats: u32::try_from(row.total_seats).unwrap_or(0),
            seats_per_row: u32::try_from(row.seats_per_row).unwrap_or(0),
            seat_layout: row.seat_layout,
            company_name: row.company_name,
            duration_minutes: u32::try_from(row.duration_minutes).unwrap_or(0),
            features: row.features,
            stops: row.stops,
        })
    }
}

#[async_trait]
impl TripCatalog for PostgresTripCatalog {
    async fn get_trip(&self, trip_id: Uuid) -> CoreResult<Trip> {
        let sql = format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS);
        let row: Option<TripRow> = sqlx::query_as(&sql)
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.ok_or(CoreError::TripNotFound(trip_id))?.try_into()
    }

    async fn search_trips(&self, query: &TripQuery) -> CoreResult<Vec<Trip>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM trips
            WHERE LOWER(departure) = LOWER($1)
              AND LOWER(destination) = LOWER($2)
              AND trip_date = $3
              AND ($4::TEXT IS NULL OR vehicle_type = $4)
            ORDER BY trip_date, trip_time, id
            "#,
            TRIP_COLUMNS
        );

        let rows: Vec<TripRow> = sqlx::query_as(&sql)
            .bind(query.from.trim())
            .bind(query.to.trim())
            .bind(query.date)
            .bind(query.vehicle_type.map(|v| v.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        info!(
            "Trip search {} -> {} on {}: {} result(s)",
            query.from,
            query.to,
            query.date,
            rows.len()
        );

        rows.into_iter().map(Trip::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::VehicleType;

    fn row(vehicle_type: &str, total_seats: i32) -> TripRow {
        TripRow {
            id: Uuid::new_v4(),
            departure: "Bursa".to_string(),
            destination: "Eskisehir".to_string(),
            trip_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            trip_time: NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
            price_amount: 18000,
            vehicle_type: vehicle_type.to_string(),
            total_seats,
            seats_per_row: 3,
            seat_layout: "2+1".to_string(),
            company_name: "Marmara Express".to_string(),
            duration_minutes: 150,
            features: vec!["wifi".to_string()],
            stops: vec![],
        }
    }

    #[test]
    fn test_row_conversion() {
        let trip = Trip::try_from(row("BUS", 29)).unwrap();
        assert_eq!(trip.vehicle_type, VehicleType::Bus);
        assert_eq!(trip.total_seats, 29);
        assert_eq!(trip.features, vec!["wifi".to_string()]);
    }

    #[test]
    fn test_negative_seat_count_collapses_to_zero() {
        let trip = Trip::try_from(row("PLANE", -4)).unwrap();
        assert_eq!(trip.total_seats, 0);
    }

    #[test]
    fn test_unknown_vehicle_type_is_internal_error() {
        assert!(matches!(
            Trip::try_from(row("TRAIN", 29)),
            Err(CoreError::InternalError(_))
        ));
    }
}
